//! Authenticated API gateway library.
//!
//! Accepts `/api/...` requests, requires a bearer token (header or cookie)
//! and forwards each request, unchanged in payload, to one configured
//! backend origin.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use proxy::Gateway;
