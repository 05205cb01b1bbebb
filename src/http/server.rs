//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener
//! - Dispatch `/api/...` requests to the forwarding gateway

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::ShutdownSignal;
use crate::proxy::{Gateway, ProxyInitError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ProxyInitError> {
        let gateway = Arc::new(Gateway::new(&config)?);

        tracing::info!(
            backend = %gateway.origin().as_str(),
            verify_tokens = config.auth.jwt_secret.is_some(),
            policy_rules = config.auth.policies.len(),
            "Gateway initialized"
        );

        let router = Self::build_router(&config, AppState { gateway });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route(
                "/api/{*path}",
                get(forward_handler)
                    .post(forward_handler)
                    .put(forward_handler)
                    .patch(forward_handler)
                    .delete(forward_handler),
            )
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(req.headers()),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `/api/{*path}`: the raw (still percent-encoded) inbound path is the target.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let target = request.uri().path().to_string();
    state.gateway.forward(request, &target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn server() -> GatewayServer {
        let mut config = GatewayConfig::default();
        config.backend.url = "http://127.0.0.1:9".into();
        GatewayServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn client_request_id_echoed() {
        let response = server()
            .router()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn api_requires_token() {
        let response = server()
            .router()
            .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unsupported_method_rejected() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let mut config = GatewayConfig::default();
        config.backend.url = "http://127.0.0.1:9".into();
        config.security.max_body_size = 8;
        let server = GatewayServer::new(config).unwrap();

        let response = server
            .router()
            .oneshot(
                Request::post("/api/upload")
                    .header("authorization", "Bearer t")
                    .header("content-length", "32")
                    .body(Body::from(vec![b'x'; 32]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
