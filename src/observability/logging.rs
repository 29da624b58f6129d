//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise `observability.log_level` applies to
//! this crate and to tower-http's request spans.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Build the filter used when `RUST_LOG` is absent.
///
/// An unparseable level means info, never the error-only filter `EnvFilter`
/// would otherwise fall back to.
pub fn default_filter(config: &ObservabilityConfig) -> EnvFilter {
    let level = config
        .log_level
        .trim()
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    EnvFilter::new(format!("marketplace_gateway={level},tower_http={level}"))
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(false))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_uses_configured_level() {
        let mut config = ObservabilityConfig::default();
        config.log_level = "debug".into();
        let rendered = default_filter(&config).to_string();
        assert!(rendered.contains("marketplace_gateway=debug"));
        assert!(rendered.contains("tower_http=debug"));
    }

    #[test]
    fn unknown_level_keeps_warnings_visible() {
        let mut config = ObservabilityConfig::default();
        config.log_level = "verbose".into();
        assert_eq!(default_filter(&config).max_level_hint(), Some(LevelFilter::INFO));
    }
}
