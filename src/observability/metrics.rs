//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, backend
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_reloads_total` (counter): reload attempts by result
//! - `gateway_pool_size` (gauge): endpoints in the active list
//!
//! Without a recorder installed every call here is a no-op, so tests and
//! metrics-disabled runs pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed proxied request.
pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("backend", backend.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a server list reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("gateway_reloads_total", "result" => result).increment(1);
}

/// Record the size of the active server list.
pub fn record_pool_size(size: usize) {
    gauge!("gateway_pool_size").set(size as f64);
}
