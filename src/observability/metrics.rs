//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bff_requests_total` (counter): requests by endpoint, method, status
//! - `bff_request_duration_seconds` (histogram): latency by endpoint
//! - `bff_upstream_retries_total` (counter): repeated upstream attempts by endpoint
//! - `bff_upstream_failures_total` (counter): requests answered with the
//!   "failed to reach backend" envelope

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(endpoint: &'static str, method: &str, status: u16, start: Instant) {
    counter!(
        "bff_requests_total",
        "endpoint" => endpoint,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("bff_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(endpoint: &'static str) {
    counter!("bff_upstream_retries_total", "endpoint" => endpoint).increment(1);
}

pub fn record_upstream_failure(endpoint: &'static str) {
    counter!("bff_upstream_failures_total", "endpoint" => endpoint).increment(1);
}
