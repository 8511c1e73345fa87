//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the proxy's metrics (request counts, latency)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `cache_proxy_requests_total` (counter): requests by method, status,
//!   and outcome (hit, miss, upload, fault)
//! - `cache_proxy_request_duration_seconds` (histogram): latency
//!   distribution by method and outcome
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Outcome labels follow the cache vocabulary rather than raw statuses,
//!   so hit rate is a single PromQL ratio

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Failure to bind is logged and tolerated: the proxy keeps serving without
/// metrics exposition.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    if let Err(error) = builder.install() {
        tracing::error!(error = %error, "Failed to install Prometheus exporter");
        return;
    }

    describe_counter!(
        "cache_proxy_requests_total",
        "Requests served, labeled by method, status, and cache outcome"
    );
    describe_histogram!(
        "cache_proxy_request_duration_seconds",
        Unit::Seconds,
        "Request latency, labeled by method and cache outcome"
    );

    tracing::info!(address = %addr, "Prometheus exporter listening");
}

/// Record one served request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "cache_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "cache_proxy_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
