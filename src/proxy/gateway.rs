//! Authenticated forwarding to the backend origin.
//!
//! # Responsibilities
//! - Authenticate the inbound request (token presence, optional policy)
//! - Rebuild the outbound header set: `Authorization` plus, for bodies,
//!   `Content-Type`
//! - Issue exactly one backend call under a deadline
//! - Relay the JSON body on success, a normalized error otherwise
//!
//! # Design Decisions
//! - Body bytes are never inspected or re-encoded
//! - Multipart bodies keep the inbound `Content-Type` so the boundary still
//!   matches the payload
//! - Backend error bodies are dropped; only the status is mirrored
//! - Redirects are not followed; a backend 3xx is mirrored like any other
//!   non-2xx status

use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::Instrument;

use crate::auth::Authenticator;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::proxy::target::{normalize_target, BackendOrigin};
use crate::proxy::ProxyInitError;
use crate::resilience::with_deadline;

const JSON_CONTENT_TYPE: &str = "application/json";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const ERROR_BODY_LOG_LIMIT: usize = 512;

/// Forwards authenticated requests to a single backend origin.
///
/// Built once at startup; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    origin: BackendOrigin,
    authenticator: Authenticator,
    backend_timeout: Duration,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ProxyInitError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(ProxyInitError::Client)?;

        let origin = BackendOrigin::parse(&config.backend.url).map_err(ProxyInitError::Origin)?;

        Ok(Self {
            client,
            origin,
            authenticator: Authenticator::from_config(&config.auth),
            backend_timeout: Duration::from_secs(config.timeouts.backend_secs),
        })
    }

    pub fn origin(&self) -> &BackendOrigin {
        &self.origin
    }

    /// Forward `request` to `<origin><target_path>`.
    ///
    /// Never fails: every error is rendered as a `{ "error": ... }` response.
    pub async fn forward(&self, request: Request<Body>, target_path: &str) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let span = tracing::info_span!(
            "forward",
            request_id = %request_id(request.headers()),
            method = %method,
            path = %target_path,
        );

        let result = self
            .try_forward(request, target_path)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match result {
            Ok(body) => {
                tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Forwarded");
                metrics::record_request(method.as_str(), StatusCode::OK.as_u16(), "ok", start);
                (StatusCode::OK, Json(body)).into_response()
            }
            Err(err) => {
                log_failure(&err);
                metrics::record_request(method.as_str(), err.status().as_u16(), err.kind(), start);
                err.into_response()
            }
        })
    }

    async fn try_forward(&self, request: Request<Body>, target_path: &str) -> Result<Value, GatewayError> {
        // Access rules and the outbound URL both use the resolved path.
        let target = normalize_target(target_path)?;
        let token = self.authenticator.authorize(request.headers(), &target)?;
        let url = self.origin.join(&target, request.uri().query())?;

        let (parts, body) = request.into_parts();
        let mut outbound = self
            .client
            .request(parts.method.clone(), url)
            .header(header::AUTHORIZATION, token.authorization_value());

        if carries_body(&parts.method) {
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(GatewayError::BodyRead)?;

            match multipart_content_type(&parts.headers) {
                Some(content_type) => {
                    outbound = outbound.header(header::CONTENT_TYPE, content_type).body(bytes);
                }
                None if !bytes.is_empty() => {
                    outbound = outbound.header(header::CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
                }
                None => {}
            }
        }

        let (status, bytes) = with_deadline(self.backend_timeout, async {
            let response = outbound.send().await.map_err(GatewayError::Transport)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(GatewayError::Transport)?;
            Ok::<_, GatewayError>((status, bytes))
        })
        .await?;

        if !status.is_success() {
            log_backend_body(status, &bytes);
            return Err(GatewayError::Backend(status));
        }

        serde_json::from_slice(&bytes).map_err(GatewayError::InvalidJson)
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// The inbound `Content-Type` when it announces multipart form data.
fn multipart_content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.to_ascii_lowercase().contains(MULTIPART_FORM_DATA))
}

fn log_failure(err: &GatewayError) {
    match err {
        GatewayError::Unauthenticated => tracing::debug!("No bearer token on request"),
        GatewayError::InvalidToken | GatewayError::Forbidden => {}
        GatewayError::InvalidPath(path) => tracing::warn!(%path, "Target path leaves /api"),
        GatewayError::Backend(status) => {
            tracing::warn!(status = status.as_u16(), "Backend returned error status")
        }
        GatewayError::Timeout => tracing::error!("Backend request timed out"),
        other => tracing::error!(error = %other, kind = other.kind(), "Failed to forward request to backend"),
    }
}

fn log_backend_body(status: StatusCode, body: &Bytes) {
    let shown = &body[..body.len().min(ERROR_BODY_LOG_LIMIT)];
    tracing::debug!(
        status = status.as_u16(),
        body = %String::from_utf8_lossy(shown),
        "Discarded backend error body"
    );
}
