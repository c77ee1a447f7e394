//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the matching route for an inbound path
//! - Reject ambiguous registrations eagerly
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan in registration order; no regex on the hot path
//! - First match wins: registration order, not specificity, resolves
//!   overlapping prefixes deterministically
//! - Two routes with an identical predicate fail at startup rather than
//!   silently shadowing each other at request time

use std::sync::Arc;

use crate::config::schema::RouteConfig;
use crate::config::validation::ValidationError;
use crate::routing::route::Route;

/// Ordered registry of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register every configured route, collecting all errors.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, Vec<ValidationError>> {
        let mut table = Self::new();
        let mut errors = Vec::new();
        for config in configs {
            match Route::compile(config) {
                Ok(route) => {
                    if let Err(e) = table.register(route) {
                        errors.push(e);
                    }
                }
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(table)
        } else {
            Err(errors)
        }
    }

    /// Register a route. Fails if another route already owns the predicate.
    pub fn register(&mut self, route: Route) -> Result<(), ValidationError> {
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.path_prefix == route.path_prefix)
        {
            return Err(ValidationError::DuplicatePredicate {
                first: existing.id.clone(),
                second: route.id.clone(),
                prefix: route.path_prefix.clone(),
            });
        }
        self.routes.push(Arc::new(route));
        Ok(())
    }

    /// Resolve an inbound path to the first registered matching route.
    pub fn matches(&self, path: &str) -> Option<Arc<Route>> {
        self.routes
            .iter()
            .find(|route| route.matches(path))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
