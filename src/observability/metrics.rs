//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, origin
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_handles_created_total` (counter): proxy handles built per origin
//! - `proxy_normalize_fallbacks_total` (counter): upstream bodies that
//!   degraded to an empty envelope, by reason
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, origin: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("origin", origin.to_string()),
    ];
    counter!("proxy_requests_total", &labels).increment(1);
    histogram!("proxy_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_handle_created(origin: &str) {
    counter!("proxy_handles_created_total", "origin" => origin.to_string()).increment(1);
}

pub fn record_normalize_fallback(reason: &'static str) {
    counter!("proxy_normalize_fallbacks_total", "reason" => reason).increment(1);
}
