//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::{GatewayConfig, GatewayServer, Shutdown};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::Response,
    Router,
};
use tokio::net::TcpListener;

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder = dyn Fn(&Captured) -> Response + Send + Sync;

#[derive(Clone)]
struct BackendState {
    requests: Arc<Mutex<Vec<Captured>>>,
    respond: Arc<Responder>,
    delay: Duration,
}

/// A recording backend on an ephemeral port.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.requests().pop().expect("backend received no request")
    }
}

/// Start a backend that answers every request with `respond(captured)`.
pub async fn start_backend<F>(respond: F) -> MockBackend
where
    F: Fn(&Captured) -> (u16, String) + Send + Sync + 'static,
{
    start_slow_backend(Duration::ZERO, respond).await
}

/// Like [`start_backend`], but waits `delay` before answering.
pub async fn start_slow_backend<F>(delay: Duration, respond: F) -> MockBackend
where
    F: Fn(&Captured) -> (u16, String) + Send + Sync + 'static,
{
    start_backend_with(delay, move |captured| {
        let (status, body) = respond(captured);
        Response::builder()
            .status(StatusCode::from_u16(status).unwrap())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    })
    .await
}

/// Start a backend that builds the whole response itself.
pub async fn start_backend_with<F>(delay: Duration, respond: F) -> MockBackend
where
    F: Fn(&Captured) -> Response + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let state = BackendState {
        requests: requests.clone(),
        respond: Arc::new(respond),
        delay,
    };
    let app = Router::new().fallback(capture).with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, requests }
}

async fn capture(State(state): State<BackendState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    let captured = Captured {
        method: parts.method,
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_default(),
        headers: parts.headers,
        body,
    };
    let response = (state.respond)(&captured);
    state.requests.lock().unwrap().push(captured);

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    response
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config pointing at `backend_url`.
pub fn gateway_config(backend_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.url = backend_url.into();
    config
}

/// Start a gateway; returns its base URL and the shutdown handle.
pub async fn start_gateway(config: GatewayConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config).unwrap();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (format!("http://{addr}"), shutdown)
}

/// The gateway's router, for sending paths a real client would rewrite.
pub fn gateway_router(config: GatewayConfig) -> Router {
    GatewayServer::new(config).unwrap().router()
}

/// Send a raw request through `router` and decode the JSON reply.
pub async fn oneshot_json(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    use tower::ServiceExt;

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
