//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portfolio_http_requests_total` (counter): requests by method, status
//! - `portfolio_http_request_duration_seconds` (histogram): latency by method
//! - `portfolio_rate_limited_total` (counter): rejections by limiter
//! - `portfolio_rate_limiter_clients` (gauge): tracked clients after each sweep
//!
//! Recording is a no-op until a recorder is installed, so tests never need
//! to set one up.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, duration: Duration) {
    counter!(
        "portfolio_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "portfolio_http_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_rate_limited(limiter: &'static str) {
    counter!("portfolio_rate_limited_total", "limiter" => limiter).increment(1);
}

pub fn record_limiter_keys(limiter: &'static str, clients: usize) {
    gauge!("portfolio_rate_limiter_clients", "limiter" => limiter).set(clients as f64);
}
