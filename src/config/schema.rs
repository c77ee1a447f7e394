//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to backend services.
    pub routes: Vec<RouteConfig>,

    /// Backend service endpoints, addressed by logical name.
    pub services: Vec<ServiceConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8072").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8072".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Route configuration mapping a path prefix to a backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub id: String,

    /// Path prefix to match. First registered match wins.
    pub path_prefix: String,

    /// Logical name of the backend service to forward to.
    pub service: String,

    /// Path rewrite applied before forwarding.
    pub rewrite: RewriteConfig,

    /// Circuit breaker settings for this route.
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Fallback served when the breaker denies or the call fails.
    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Path rewrite rule: a regex with named capture groups and a
/// substitution template referencing them as `${name}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteConfig {
    /// Regex matched against the inbound path (query string excluded).
    pub pattern: String,

    /// Template the matched portion is replaced with.
    pub template: String,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Breaker name for logs/metrics. Defaults to the route id.
    pub name: Option<String>,

    /// Consecutive failures that trip the breaker open.
    pub failure_threshold: u32,

    /// Seconds the breaker stays open before admitting a probe.
    pub cool_down_secs: u64,

    /// Maximum concurrent trial requests while half-open.
    pub half_open_trials: u32,

    /// Backend status codes recorded as breaker failures.
    /// Responses with these statuses are still passed through to the client.
    pub trip_statuses: Vec<u16>,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: None,
            failure_threshold: 5,
            cool_down_secs: 10,
            half_open_trials: 1,
            trip_statuses: vec![502, 503, 504],
        }
    }
}

/// Fallback configuration.
///
/// By default a local, deterministic payload is served. Setting `service`
/// forwards the fallback to a remote target instead; if that target is
/// unreachable the client still receives a fixed last-resort payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Status code of the local fallback response.
    pub status: u16,

    /// Message carried in the local fallback body.
    pub message: String,

    /// Optional remote fallback service name.
    pub service: Option<String>,

    /// Path requested on the remote fallback service.
    pub path: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            status: 503,
            message: "An error occurred. Please try after some time or contact support team!!!"
                .to_string(),
            service: None,
            path: "/contactSupport".to_string(),
        }
    }
}

/// Backend service endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Logical service name referenced by routes.
    pub name: String,

    /// Endpoint address (e.g., "127.0.0.1:8080").
    pub address: String,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total inbound request deadline in seconds.
    pub request_secs: u64,

    /// Per-call upstream deadline in seconds. Expiry counts as a
    /// breaker failure, never a hang.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
