//! HTTP server setup and the gateway request handler.
//!
//! # Responsibilities
//! - Compile the route table, resolver, and forwarder eagerly at startup
//! - Wire up middleware (tracing, request deadline, request ID, backpressure)
//! - Dispatch every inbound request through the gateway control flow:
//!   route match -> breaker gate -> rewrite -> forward -> header injection,
//!   with the fallback path on denial or failure

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig};
use crate::filters::{ensure_correlation_id, stamp_response_time};
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::upstream::{Forwarder, ServiceResolver, StaticResolver};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct GatewayState {
    pub table: Arc<RouteTable>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the edge gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Compile the configuration into a request-ready server.
    ///
    /// Any configuration problem is fatal here, before traffic is accepted.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config)?;

        let table = Arc::new(RouteTable::from_config(&config.routes)?);
        let resolver: Arc<dyn ServiceResolver> =
            Arc::new(StaticResolver::from_config(&config.services)?);
        let forwarder = Arc::new(Forwarder::new(resolver, &config.timeouts));

        let state = GatewayState { table, forwarder };
        let router = Self::build_router(&config, state);

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: GatewayState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(GlobalConcurrencyLimitLayer::new(
                        config.listener.max_connections,
                    )),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "gateway listening"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler.
///
/// Matches the route, asks its breaker for permission, rewrites the path,
/// forwards once, and stamps the diagnostic header on whatever goes back.
async fn gateway_handler(
    State(state): State<GatewayState>,
    mut request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let correlation_id = ensure_correlation_id(request.headers_mut());

    let Some(route) = state.table.matches(&path) else {
        tracing::debug!(
            path = %path,
            correlation_id = %correlation_id,
            "no route matched"
        );
        metrics::record_request(&method, 404, "none", start);
        return (StatusCode::NOT_FOUND, "no matching route").into_response();
    };

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or(path);

    // Breaker gate. A denial must not pay any network latency.
    let Some(permit) = route.breaker.try_acquire() else {
        tracing::debug!(
            route = %route.id,
            correlation_id = %correlation_id,
            "circuit open, serving fallback"
        );
        let response = route.fallback.respond(&route.id, &state.forwarder).await;
        metrics::record_fallback(&route.id);
        return complete(response, &method, &route.id, start);
    };

    let rewritten = match route.rewrite.apply(&path_and_query) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            // The predicate accepted this path, so the pattern must match:
            // this is a configuration/logic bug, not a client error.
            tracing::error!(
                route = %route.id,
                correlation_id = %correlation_id,
                error = %e,
                "routed path failed its own rewrite pattern"
            );
            drop(permit);
            metrics::record_request(&method, 500, &route.id, start);
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal routing error").into_response();
        }
    };

    let (parts, body) = request.into_parts();
    match state
        .forwarder
        .forward(&route.service, &rewritten, parts.method, &parts.headers, body)
        .await
    {
        Ok(response) => {
            let status = response.status().as_u16();
            // Configured failure classes still pass through to the client;
            // only the breaker bookkeeping records them.
            if route.breaker.trips_on(status) {
                permit.failure();
            } else {
                permit.success();
            }
            complete(response, &method, &route.id, start)
        }
        Err(e) => {
            tracing::warn!(
                route = %route.id,
                correlation_id = %correlation_id,
                error = %e,
                "forward attempt failed, serving fallback"
            );
            permit.failure();
            let response = route.fallback.respond(&route.id, &state.forwarder).await;
            metrics::record_fallback(&route.id);
            complete(response, &method, &route.id, start)
        }
    }
}

/// Stamp outbound diagnostics and record the request.
fn complete(mut response: Response, method: &str, route_id: &str, start: Instant) -> Response {
    stamp_response_time(response.headers_mut());
    metrics::record_request(method, response.status().as_u16(), route_id, start);
    response
}
