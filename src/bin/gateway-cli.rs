use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Send authenticated requests through a running API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token presented to the gateway
    #[arg(short, long, env = "GATEWAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the gateway is up
    Health,
    /// GET an API path (e.g. /api/certificates/ABC123)
    Get { path: String },
    /// Send a request with an optional JSON body
    Send {
        /// POST, PUT, PATCH or DELETE
        method: String,
        path: String,
        #[arg(long)]
        json: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Get { path } => {
            client
                .get(format!("{base}{path}"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Send { method, path, json } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut req = client.request(method, format!("{base}{path}")).headers(headers);
            if let Some(body) = json {
                serde_json::from_str::<Value>(&body)?;
                req = req.header(CONTENT_TYPE, "application/json").body(body);
            }
            req.send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{rendered}");
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{rendered}");
    }
    Ok(())
}
