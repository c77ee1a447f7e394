//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing services)
//! - Reject ambiguous routes (identical path prefixes)
//! - Compile-check rewrite rules and breaker thresholds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::filters::rewrite::RewriteRule;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route `{0}` is defined more than once")]
    DuplicateRouteId(String),

    #[error("routes `{first}` and `{second}` share the predicate `{prefix}`")]
    DuplicatePredicate {
        first: String,
        second: String,
        prefix: String,
    },

    #[error("route `{route}`: path prefix `{prefix}` must start with '/'")]
    PredicateNotRooted { route: String, prefix: String },

    #[error("route `{route}`: invalid rewrite rule: {reason}")]
    InvalidRewrite { route: String, reason: String },

    #[error("route `{route}`: {field} must be at least 1")]
    InvalidBreakerSetting { route: String, field: &'static str },

    #[error("route `{route}`: fallback status {status} is not a valid HTTP status code")]
    InvalidFallbackStatus { route: String, status: u16 },

    #[error("route `{route}` targets unknown service `{service}`")]
    UnknownService { route: String, service: String },

    #[error("route `{route}` names unknown fallback service `{service}`")]
    UnknownFallbackService { route: String, service: String },

    #[error("service `{0}` is defined more than once")]
    DuplicateService(String),

    #[error("service `{service}`: invalid address `{address}`")]
    InvalidServiceAddress { service: String, address: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut service_names = HashSet::new();
    for service in &config.services {
        if !service_names.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }
        if Url::parse(&format!("http://{}", service.address)).is_err() {
            errors.push(ValidationError::InvalidServiceAddress {
                service: service.name.clone(),
                address: service.address.clone(),
            });
        }
    }

    let mut route_ids = HashSet::new();
    let mut predicates: Vec<(&str, &str)> = Vec::new();
    for route in &config.routes {
        if !route_ids.insert(route.id.as_str()) {
            errors.push(ValidationError::DuplicateRouteId(route.id.clone()));
        }

        if !route.path_prefix.starts_with('/') {
            errors.push(ValidationError::PredicateNotRooted {
                route: route.id.clone(),
                prefix: route.path_prefix.clone(),
            });
        }

        if let Some((first, _)) = predicates
            .iter()
            .find(|(_, prefix)| *prefix == route.path_prefix)
        {
            errors.push(ValidationError::DuplicatePredicate {
                first: (*first).to_string(),
                second: route.id.clone(),
                prefix: route.path_prefix.clone(),
            });
        } else {
            predicates.push((&route.id, &route.path_prefix));
        }

        if let Err(e) = RewriteRule::compile(&route.rewrite.pattern, &route.rewrite.template) {
            errors.push(ValidationError::InvalidRewrite {
                route: route.id.clone(),
                reason: e.to_string(),
            });
        }

        if route.breaker.failure_threshold == 0 {
            errors.push(ValidationError::InvalidBreakerSetting {
                route: route.id.clone(),
                field: "failure_threshold",
            });
        }
        if route.breaker.cool_down_secs == 0 {
            errors.push(ValidationError::InvalidBreakerSetting {
                route: route.id.clone(),
                field: "cool_down_secs",
            });
        }
        if route.breaker.half_open_trials == 0 {
            errors.push(ValidationError::InvalidBreakerSetting {
                route: route.id.clone(),
                field: "half_open_trials",
            });
        }

        if StatusCode::from_u16(route.fallback.status).is_err() {
            errors.push(ValidationError::InvalidFallbackStatus {
                route: route.id.clone(),
                status: route.fallback.status,
            });
        }

        if !service_names.contains(route.service.as_str()) {
            errors.push(ValidationError::UnknownService {
                route: route.id.clone(),
                service: route.service.clone(),
            });
        }
        if let Some(fallback_service) = &route.fallback.service {
            if !service_names.contains(fallback_service.as_str()) {
                errors.push(ValidationError::UnknownFallbackService {
                    route: route.id.clone(),
                    service: fallback_service.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
