//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_fallback_total` (counter): fallback responses by route
//! - `gateway_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `gateway_breaker_transitions_total` (counter): transitions by breaker, state
//!
//! # Design Decisions
//! - Low-overhead updates via the `metrics` facade; a process without an
//!   installed recorder pays nothing
//! - Prometheus exposition on its own listener, separate from traffic

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one completed inbound request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a fallback response for a route.
pub fn record_fallback(route: &str) {
    counter!("gateway_fallback_total", "route" => route.to_string()).increment(1);
}

/// Record a circuit breaker state transition.
pub fn record_breaker_transition(breaker: &str, state: &str) {
    let level = match state {
        "closed" => 0.0,
        "half-open" => 1.0,
        _ => 2.0,
    };
    gauge!("gateway_breaker_state", "breaker" => breaker.to_string()).set(level);
    counter!(
        "gateway_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "state" => state.to_string()
    )
    .increment(1);
}
