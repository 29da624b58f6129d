//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers & middleware produce:
//!     → logging.rs (tracing events, pretty or JSON)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout / log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
