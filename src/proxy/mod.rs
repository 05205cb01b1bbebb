//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request + target path
//!     → target.rs (prefix with /api, join onto the backend origin)
//!     → gateway.rs (authenticate, rebuild headers/body, one backend call)
//!     → JSON relay (200) or { "error": ... } with mirrored/gateway status
//! ```

pub mod gateway;
pub mod target;

use thiserror::Error;

pub use gateway::Gateway;
pub use target::{normalize_target, BackendOrigin};

/// Failure to build the gateway at startup.
#[derive(Debug, Error)]
pub enum ProxyInitError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid backend origin: {0}")]
    Origin(#[source] url::ParseError),
}
