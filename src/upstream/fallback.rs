//! Fallback responses for denied or failed backend calls.
//!
//! # Responsibilities
//! - Produce a deterministic response without contacting the route's backend
//! - Optionally delegate to a remote fallback target
//! - Guarantee a fixed last-resort payload when even the fallback fails
//!
//! # Design Decisions
//! - Fallback responses never touch the route's circuit breaker
//! - The local payload is static per route; no per-request computation
//!   beyond inserting the route id

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

use crate::config::schema::FallbackConfig;
use crate::upstream::forwarder::Forwarder;

/// A remote fallback target, consulted instead of the local payload.
#[derive(Debug, Clone)]
pub struct RemoteFallback {
    pub service: String,
    pub path: String,
}

/// Compiled per-route fallback.
#[derive(Debug, Clone)]
pub struct Fallback {
    status: StatusCode,
    message: String,
    remote: Option<RemoteFallback>,
}

impl Fallback {
    /// Compile from configuration; an out-of-range status is rejected.
    pub fn compile(config: &FallbackConfig) -> Result<Self, axum::http::status::InvalidStatusCode> {
        let status = StatusCode::from_u16(config.status)?;
        let remote = config.service.as_ref().map(|service| RemoteFallback {
            service: service.clone(),
            path: config.path.clone(),
        });
        Ok(Self {
            status,
            message: config.message.clone(),
            remote,
        })
    }

    /// Produce the fallback response for a route.
    pub async fn respond(&self, route_id: &str, forwarder: &Forwarder) -> Response<Body> {
        if let Some(remote) = &self.remote {
            match forwarder.fetch_fallback(&remote.service, &remote.path).await {
                Ok(response) => return response,
                Err(e) => {
                    tracing::warn!(
                        route = %route_id,
                        fallback_service = %remote.service,
                        error = %e,
                        "fallback target unreachable, serving last resort"
                    );
                    return last_resort();
                }
            }
        }
        self.local_response(route_id)
    }

    fn local_response(&self, route_id: &str) -> Response<Body> {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "message": self.message,
            "route": route_id,
        });
        json_response(self.status, body.to_string())
    }
}

/// Fixed payload served when no fallback path is viable.
pub fn last_resort() -> Response<Body> {
    json_response(
        StatusCode::SERVICE_UNAVAILABLE,
        r#"{"status":503,"message":"Service is temporarily unavailable. Please try again later."}"#
            .to_string(),
    )
}

fn json_response(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_default_config() {
        let fallback = Fallback::compile(&FallbackConfig::default()).unwrap();
        assert_eq!(fallback.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(fallback.remote.is_none());
    }

    #[test]
    fn rejects_out_of_range_status() {
        let config = FallbackConfig {
            status: 99,
            ..Default::default()
        };
        assert!(Fallback::compile(&config).is_err());
    }

    #[test]
    fn local_response_carries_route_and_message() {
        let config = FallbackConfig {
            message: "Account service is busy".to_string(),
            ..Default::default()
        };
        let fallback = Fallback::compile(&config).unwrap();
        let response = fallback.local_response("account_route");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn last_resort_is_fixed() {
        let response = last_resort();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
