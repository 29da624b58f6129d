//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Upstream API base URL.
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
/// Listener bind address.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";
/// Log level fallback when `RUST_LOG` is unset.
pub const ENV_LOG_LEVEL: &str = "GATEWAY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Build a configuration from defaults and the process environment only.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default())
}

fn finalize(config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment values onto a parsed configuration.
///
/// `lookup` abstracts `std::env::var` so callers (and tests) control the source.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_API_BASE_URL) {
        config.upstream.base_url = url;
    }
    if let Some(addr) = non_empty(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(level) = non_empty(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
    config
}
