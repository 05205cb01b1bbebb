//! Bearer token extraction.
//!
//! Precedence:
//! 1. `Authorization: Bearer <token>` (literal, case-sensitive prefix)
//! 2. the token cookie (`token` unless configured otherwise)
//!
//! Only presence is established here. Signature and expiry are the
//! backend's concern unless the access policy is enabled.

use axum::http::{header, HeaderMap};

const BEARER_PREFIX: &str = "Bearer ";

/// An opaque bearer credential taken from the inbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an outbound `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.0)
    }
}

// Tokens end up in spans and error logs; never print the credential.
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(<{} bytes>)", self.0.len())
    }
}

/// Pull the bearer token from the `Authorization` header or the named cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<BearerToken> {
    from_authorization(headers).or_else(|| from_cookie(headers, cookie_name))
}

fn from_authorization(headers: &HeaderMap) -> Option<BearerToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?;

    (!token.is_empty()).then(|| BearerToken::new(token))
}

fn from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<BearerToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(BearerToken::new)
}
