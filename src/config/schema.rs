//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section is defaulted so an empty file (or no file at all) plus
//! `API_BASE_URL` in the environment is a complete configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API the proxy forwards to.
    pub upstream: UpstreamConfig,

    /// Proxy route family settings.
    pub proxy: ProxyRouteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend API, e.g. "https://api.example.com/api".
    /// Usually supplied through `API_BASE_URL`.
    pub base_url: String,

    /// Total time allowed for one upstream exchange, in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Settings for the proxied route family.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxyRouteConfig {
    /// Prefix the wildcard route is mounted under. No trailing slash.
    pub mount_path: String,

    /// Cookie holding the access token forwarded as a bearer token.
    pub token_cookie: String,

    /// Maximum inbound body size in bytes (uploads included).
    pub max_body_size: usize,
}

impl Default for ProxyRouteConfig {
    fn default() -> Self {
        Self {
            mount_path: "/api/proxy".to_string(),
            token_cookie: "access_token".to_string(),
            max_body_size: 20 * 1024 * 1024, // 20MB, room for image uploads
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
