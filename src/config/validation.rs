//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the backend origin and bind addresses parse
//! - Check access rules are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("backend.url '{0}' must be an absolute http(s) URL with a host")]
    BackendUrl(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("auth.cookie_name must not be empty")]
    EmptyCookieName,

    #[error("auth.jwt_secret must not be empty when set")]
    EmptyJwtSecret,

    #[error("auth.policies path_prefix '{0}' must start with '/'")]
    PolicyPrefix(String),

    #[error("auth.policies rule for '{0}' lists no roles")]
    PolicyWithoutRoles(String),

    #[error("auth.policies are configured but auth.jwt_secret is not set")]
    PoliciesWithoutSecret,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.backend.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::BackendUrl(config.backend.url.clone())),
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("connect_secs", timeouts.connect_secs),
        ("backend_secs", timeouts.backend_secs),
        ("request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let auth = &config.auth;
    if auth.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }
    if auth.jwt_secret.as_deref().is_some_and(|s| s.is_empty()) {
        errors.push(ValidationError::EmptyJwtSecret);
    }
    if !auth.policies.is_empty() && auth.jwt_secret.is_none() {
        errors.push(ValidationError::PoliciesWithoutSecret);
    }
    for rule in &auth.policies {
        if !rule.path_prefix.starts_with('/') {
            errors.push(ValidationError::PolicyPrefix(rule.path_prefix.clone()));
        }
        if rule.roles.is_empty() {
            errors.push(ValidationError::PolicyWithoutRoles(rule.path_prefix.clone()));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
