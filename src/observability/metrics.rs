//! Metrics collection and exposition.
//!
//! # Metrics
//! - `segment_proxy_requests_total` (counter): handled requests by route, status
//! - `segment_proxy_request_duration_seconds` (histogram): time to complete a request
//! - `segment_proxy_bytes_sent_total` (counter): body bytes sent to clients by route
//! - `segment_proxy_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until a
//!   recorder is installed
//! - The Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "segment_proxy_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("segment_proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record body bytes delivered to a client.
pub fn record_bytes_sent(route: &'static str, bytes: u64) {
    metrics::counter!("segment_proxy_bytes_sent_total", "route" => route).increment(bytes);
}

/// Publish the current number of open client connections.
pub fn set_active_connections(count: u64) {
    metrics::gauge!("segment_proxy_active_connections").set(count as f64);
}
