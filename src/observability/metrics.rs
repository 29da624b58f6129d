//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency by method
//! - `gateway_upstream_errors_total` (counter): local/transport failures by kind
//!
//! Without an installed recorder the macros are no-ops, so handlers record
//! unconditionally.

use std::net::SocketAddr;
use std::time::Instant;
use axum::http::Method;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside the Tokio runtime; the exporter spawns its own task.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one completed proxied request.
pub fn record_request(method: &Method, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that never produced an upstream response.
pub fn record_upstream_error(kind: &'static str) {
    counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}
