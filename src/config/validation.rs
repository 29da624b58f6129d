//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. Validation is a pure
//! function over [`GatewayConfig`] and reports every problem it finds, not
//! just the first.

use std::net::SocketAddr;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url is not set (export API_BASE_URL or set it in the config file)")]
    MissingUpstream,

    #[error("upstream.base_url {url:?} is invalid: {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("proxy.mount_path {0:?} must start with '/' and must not end with '/'")]
    InvalidMountPath(String),

    #[error("proxy.token_cookie must not be empty")]
    EmptyCookieName,

    #[error("observability.log_level {0:?} is not one of off, error, warn, info, debug, trace")]
    InvalidLogLevel(String),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_base_url(&config.upstream.base_url) {
        errors.push(e);
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "upstream.timeout_secs" });
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "upstream.connect_timeout_secs" });
    }
    if config.proxy.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue { field: "proxy.max_body_size" });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let mount = &config.proxy.mount_path;
    if !mount.starts_with('/') || mount.ends_with('/') {
        errors.push(ValidationError::InvalidMountPath(mount.clone()));
    }

    if config.proxy.token_cookie.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }

    if config.observability.log_level.trim().parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_base_url(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingUpstream);
    }

    let invalid = |reason: &str| ValidationError::InvalidUpstream {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query string or fragment"));
    }
    Ok(())
}
