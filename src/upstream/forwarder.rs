//! Request forwarding to backend services.
//!
//! # Responsibilities
//! - Resolve the target endpoint and issue the single backend call
//! - Forward method, filtered headers, and the streamed body
//! - Enforce the mandatory per-call timeout
//! - Classify connection failures and timeouts for breaker bookkeeping
//!
//! # Design Decisions
//! - No automatic retry: one client request maps to at most one attempt
//! - Hop-by-hop headers (and any named by `Connection`) never cross the hop
//! - Responses stream back verbatim; the gateway is agnostic to the body
//! - Dropping the returned future cancels the in-flight upstream call

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Method, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::schema::TimeoutConfig;
use crate::upstream::resolver::{ResolveError, ServiceResolver};

/// Headers that are meaningful only for a single transport hop.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Error issuing a backend call. Every variant counts as a breaker failure.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("backend `{service}` unreachable: {source}")]
    Unreachable {
        service: String,
        source: hyper_util::client::legacy::Error,
    },

    #[error("backend `{service}` timed out after {after:?}")]
    Timeout { service: String, after: Duration },

    #[error("cannot build upstream request for `{service}`: {reason}")]
    InvalidTarget { service: String, reason: String },
}

/// Executes backend calls on behalf of matched routes.
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    resolver: Arc<dyn ServiceResolver>,
    upstream_timeout: Duration,
}

impl Forwarder {
    pub fn new(resolver: Arc<dyn ServiceResolver>, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            resolver,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }

    /// Issue the single backend call for a request.
    ///
    /// The rewritten path (with query) replaces the inbound path; the
    /// method and end-to-end headers are forwarded as received.
    pub async fn forward(
        &self,
        service: &str,
        target_path: &str,
        method: Method,
        headers: &HeaderMap,
        body: Body,
    ) -> Result<Response<Body>, ForwardError> {
        let uri = self.target_uri(service, target_path)?;

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .map_err(|e| ForwardError::InvalidTarget {
                service: service.to_string(),
                reason: e.to_string(),
            })?;
        *request.headers_mut() = forwardable_headers(headers);

        self.dispatch(service, request).await
    }

    /// Fetch a remote fallback target. Same timeout discipline as a
    /// regular forward, but never touches any route's breaker.
    pub async fn fetch_fallback(
        &self,
        service: &str,
        path: &str,
    ) -> Result<Response<Body>, ForwardError> {
        let uri = self.target_uri(service, path)?;
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .map_err(|e| ForwardError::InvalidTarget {
                service: service.to_string(),
                reason: e.to_string(),
            })?;

        self.dispatch(service, request).await
    }

    async fn dispatch(
        &self,
        service: &str,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let started = Instant::now();
        let response =
            match tokio::time::timeout(self.upstream_timeout, self.client.request(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(source)) => {
                    return Err(ForwardError::Unreachable {
                        service: service.to_string(),
                        source,
                    })
                }
                Err(_) => {
                    return Err(ForwardError::Timeout {
                        service: service.to_string(),
                        after: self.upstream_timeout,
                    })
                }
            };

        tracing::debug!(
            service = %service,
            status = %response.status(),
            latency_ms = started.elapsed().as_millis() as u64,
            "upstream answered"
        );

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }

    fn target_uri(&self, service: &str, path_and_query: &str) -> Result<Uri, ForwardError> {
        let endpoint = self.resolver.resolve(service)?;
        let url = endpoint
            .base_url
            .join(path_and_query)
            .map_err(|e| ForwardError::InvalidTarget {
                service: service.to_string(),
                reason: e.to_string(),
            })?;
        Uri::try_from(url.as_str()).map_err(|e| ForwardError::InvalidTarget {
            service: service.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Copy the end-to-end headers of a request, dropping the hop-by-hop set,
/// anything named by `Connection`, and `Host` (re-derived from the target).
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();

    let connection_named: Vec<HeaderName> = forwarded
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in connection_named {
        forwarded.remove(&name);
    }

    for name in HOP_BY_HOP {
        forwarded.remove(name);
    }
    forwarded.remove(header::HOST);

    forwarded
}
