//! Authenticated API Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   API GATEWAY                     │
//!                     │                                                   │
//!  Client Request     │  ┌─────────┐   ┌─────────┐   ┌───────────────┐   │
//!  ───────────────────┼─▶│  http   │──▶│  auth   │──▶│    proxy      │───┼──▶ Backend
//!                     │  │ server  │   │ token + │   │ gateway +     │   │    Origin
//!  Client Response    │  │         │   │ policy  │   │ deadline      │   │
//!  ◀──────────────────┼──│         │◀──┴─────────┴───│ JSON relay    │◀──┼───
//!                     │  └─────────┘                 └───────────────┘   │
//!                     │                                                   │
//!                     │  config · observability · resilience · lifecycle  │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::loader;
use api_gateway::config::validation::validate_config;
use api_gateway::http::GatewayServer;
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Authenticated forwarding gateway for the backend API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(long)]
    bind: Option<String>,

    /// Override backend.url
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = loader::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(url) = args.backend_url {
        config.backend.url = url;
    }
    validate_config(&config).map_err(loader::ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.url,
        backend_timeout_secs = config.timeouts.backend_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
