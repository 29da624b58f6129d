//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, overlay API_BASE_URL & friends)
//!     → validation.rs (semantic checks, all errors at once)
//!     → GatewayConfig (validated, immutable)
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps in a new forwarder
//! ```

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyRouteConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
