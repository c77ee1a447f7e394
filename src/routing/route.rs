//! Compiled route definitions.
//!
//! # Responsibilities
//! - Turn a RouteConfig into an immutable, request-ready Route
//! - Own the route's circuit breaker and compiled fallback
//!
//! # Design Decisions
//! - Routes compiled once at startup, immutable at runtime
//! - Compilation failures are configuration errors, fatal before serving

use crate::config::schema::RouteConfig;
use crate::config::validation::ValidationError;
use crate::filters::rewrite::RewriteRule;
use crate::resilience::CircuitBreaker;
use crate::upstream::fallback::Fallback;

/// A configured rule mapping a path prefix to a backend service, its
/// filters, its circuit breaker, and its fallback.
#[derive(Debug)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub id: String,

    /// Path prefix predicate; first registered match wins.
    pub path_prefix: String,

    /// Logical name of the backend service.
    pub service: String,

    /// Compiled path rewrite rule.
    pub rewrite: RewriteRule,

    /// Circuit breaker owned by exactly this route.
    pub breaker: CircuitBreaker,

    /// Fallback served when the breaker denies or the call fails.
    pub fallback: Fallback,
}

impl Route {
    /// Compile a route from configuration, validating eagerly.
    pub fn compile(config: &RouteConfig) -> Result<Self, ValidationError> {
        let rewrite = RewriteRule::compile(&config.rewrite.pattern, &config.rewrite.template)
            .map_err(|e| ValidationError::InvalidRewrite {
                route: config.id.clone(),
                reason: e.to_string(),
            })?;

        let breaker_name = config
            .breaker
            .name
            .clone()
            .unwrap_or_else(|| config.id.clone());
        let breaker = CircuitBreaker::new(breaker_name, &config.breaker);

        let fallback =
            Fallback::compile(&config.fallback).map_err(|_| ValidationError::InvalidFallbackStatus {
                route: config.id.clone(),
                status: config.fallback.status,
            })?;

        Ok(Self {
            id: config.id.clone(),
            path_prefix: config.path_prefix.clone(),
            service: config.service.clone(),
            rewrite,
            breaker,
            fallback,
        })
    }

    /// Test the route's path predicate.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix)
    }
}
