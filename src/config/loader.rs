//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the backend origin.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";
/// Accepted when `BACKEND_URL` is unset, for deployments that share the
/// front end's environment file.
pub const PUBLIC_BACKEND_URL_ENV: &str = "NEXT_PUBLIC_BACKEND_URL";
pub const BIND_ADDRESS_ENV: &str = "GATEWAY_BIND_ADDRESS";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the process configuration: optional file, then `.env` and process
/// environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto a config. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(BACKEND_URL_ENV).or_else(|| get(PUBLIC_BACKEND_URL_ENV)) {
        config.backend.url = url;
    }
    if let Some(addr) = get(BIND_ADDRESS_ENV) {
        config.listener.bind_address = addr;
    }
    if let Some(secret) = get(JWT_SECRET_ENV) {
        config.auth.jwt_secret = Some(secret);
    }
}
