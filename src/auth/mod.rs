//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound headers
//!     → token.rs (Authorization: Bearer, then token cookie)
//!     → [claims.rs] (HS256 verification, only with auth.jwt_secret)
//!     → [policy.rs] (role rules by target path)
//!     → BearerToken handed to the forwarding gateway unchanged
//! ```

pub mod claims;
pub mod policy;
pub mod token;

use axum::http::HeaderMap;

pub use claims::{Claims, Role, TokenError, TokenVerifier};
pub use policy::{AccessPolicy, Decision};
pub use token::{extract_token, BearerToken};

use crate::config::AuthConfig;
use crate::error::GatewayError;

/// Decides whether an inbound request may be forwarded, and with which token.
#[derive(Debug, Clone)]
pub struct Authenticator {
    cookie_name: String,
    verifier: Option<TokenVerifier>,
    policy: AccessPolicy,
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            verifier: config
                .jwt_secret
                .as_deref()
                .map(|secret| TokenVerifier::new(secret, config.leeway_secs)),
            policy: AccessPolicy::from_config(&config.policies),
        }
    }

    /// Extract the token and, when verification is configured, check it
    /// against the access policy for `target_path`.
    pub fn authorize(
        &self,
        headers: &HeaderMap,
        target_path: &str,
    ) -> Result<BearerToken, GatewayError> {
        let token = extract_token(headers, &self.cookie_name).ok_or(GatewayError::Unauthenticated)?;

        let Some(verifier) = &self.verifier else {
            return Ok(token);
        };

        let claims = verifier.verify(token.as_str()).map_err(|err| {
            tracing::warn!(error = %err, "access token rejected");
            GatewayError::InvalidToken
        })?;

        match self.policy.decide(target_path, &claims) {
            Decision::Allow => Ok(token),
            Decision::Deny => {
                tracing::warn!(
                    sub = %claims.sub,
                    role = ?claims.role,
                    path = %target_path,
                    "access denied by policy"
                );
                Err(GatewayError::Forbidden)
            }
        }
    }
}
