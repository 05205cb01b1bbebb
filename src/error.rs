//! Request-path errors and their client-facing representation.
//!
//! Every failure is terminal for the current request and rendered as
//! `{ "error": "<message>" }`. Backend error bodies and internal causes are
//! never echoed to the client; causes stay on the error for logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of every error response produced by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    #[error("Error from backend: {}", .0.as_u16())]
    Backend(StatusCode),

    #[error("Backend request timed out")]
    Timeout,

    #[error("failed to read inbound body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("backend transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("invalid outbound request: {0}")]
    InvalidRequest(String),
}

const FORWARD_FAILED: &str = "Failed to forward request to backend";
const INVALID_PATH: &str = "Invalid request path";

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthenticated | GatewayError::InvalidToken => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend(status) => *status,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::BodyRead(_)
            | GatewayError::Transport(_)
            | GatewayError::InvalidJson(_)
            | GatewayError::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal causes collapse to one
    /// generic message.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::BodyRead(_)
            | GatewayError::Transport(_)
            | GatewayError::InvalidJson(_)
            | GatewayError::InvalidRequest(_) => FORWARD_FAILED.to_string(),
            GatewayError::InvalidPath(_) => INVALID_PATH.to_string(),
            other => other.to_string(),
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unauthenticated => "unauthenticated",
            GatewayError::InvalidToken => "invalid_token",
            GatewayError::Forbidden => "forbidden",
            GatewayError::InvalidPath(_) => "invalid_path",
            GatewayError::Backend(_) => "backend_error",
            GatewayError::Timeout => "timeout",
            GatewayError::BodyRead(_) => "body_read",
            GatewayError::Transport(_) => "transport",
            GatewayError::InvalidJson(_) => "invalid_json",
            GatewayError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
