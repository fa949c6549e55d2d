//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cors_requests_total` (counter): requests by origin outcome
//!   (`allowed`, `blocked`, `no_origin`)
//! - `cors_preflight_total` (counter): `OPTIONS` requests answered directly
//! - `proxy_upstream_errors_total` (counter): failed forwards

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_origin_decision(outcome: &'static str) {
    counter!("cors_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_preflight() {
    counter!("cors_preflight_total").increment(1);
}

pub fn record_upstream_error() {
    counter!("proxy_upstream_errors_total").increment(1);
}
