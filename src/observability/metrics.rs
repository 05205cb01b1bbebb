//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by method, status, outcome
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency by method, outcome
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the exporter
//! - `outcome` is `ok` or the error kind, keeping label cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one forwarded request.
pub fn record_request(method: &str, status: u16, outcome: &str, start: Instant) {
    let method = method.to_string();
    let outcome = outcome.to_string();

    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.to_string(),
        "outcome" => outcome.clone()
    )
    .increment(1);

    ::metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
