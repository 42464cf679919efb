//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mock_requests_total` (counter): requests by method, status
//! - `mock_request_duration_seconds` (histogram): latency distribution
//! - `mock_reloads_total` (counter): reload attempts by outcome
//! - `mock_file_events_total` (counter): debounced file changes by kind
//! - `mock_routes` (gauge): routes in the current table

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "mock_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("mock_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_reload(outcome: &'static str) {
    metrics::counter!("mock_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_file_event(kind: &'static str) {
    metrics::counter!("mock_file_events_total", "kind" => kind).increment(1);
}

pub fn record_route_count(routes: usize) {
    metrics::gauge!("mock_routes").set(routes as f64);
}
