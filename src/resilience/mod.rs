//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (enforce the per-call deadline)
//!     → On expiry: GatewayError::Timeout (504), no retry
//! ```
//!
//! # Design Decisions
//! - Every backend call has a deadline
//! - A single backend call per inbound request; no retries, backoff or
//!   circuit breaking
//! - Timeout errors are distinct from transport errors

pub mod timeouts;

pub use timeouts::with_deadline;
