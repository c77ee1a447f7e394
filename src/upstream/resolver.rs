//! Service name resolution.
//!
//! # Responsibilities
//! - Translate a logical service name into a reachable endpoint
//! - Keep the gateway core agnostic to the discovery mechanism
//!
//! # Design Decisions
//! - Resolution is a trait seam; the shipped implementation is a static
//!   table built from configuration, but anything answering `resolve`
//!   (DNS, a discovery client, a load balancer) can be plugged in
//! - Endpoint addresses are validated once at startup

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;
use crate::config::validation::ValidationError;

/// Error resolving a logical service name.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("no endpoint registered for service `{0}`")]
    UnknownService(String),
}

/// A resolved backend endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Pre-validated base URL for the service.
    pub base_url: Url,
}

/// Maps a logical backend name to a network endpoint.
pub trait ServiceResolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, service: &str) -> Result<Endpoint, ResolveError>;
}

/// Resolver backed by the static `[[services]]` configuration section.
#[derive(Debug, Default)]
pub struct StaticResolver {
    endpoints: HashMap<String, Endpoint>,
}

impl StaticResolver {
    /// Build the resolver from configuration, collecting all errors.
    pub fn from_config(services: &[ServiceConfig]) -> Result<Self, Vec<ValidationError>> {
        let mut endpoints = HashMap::new();
        let mut errors = Vec::new();

        for service in services {
            match Url::parse(&format!("http://{}", service.address)) {
                Ok(base_url) => {
                    if endpoints
                        .insert(service.name.clone(), Endpoint { base_url })
                        .is_some()
                    {
                        errors.push(ValidationError::DuplicateService(service.name.clone()));
                    }
                }
                Err(_) => errors.push(ValidationError::InvalidServiceAddress {
                    service: service.name.clone(),
                    address: service.address.clone(),
                }),
            }
        }

        if errors.is_empty() {
            Ok(Self { endpoints })
        } else {
            Err(errors)
        }
    }
}

impl ServiceResolver for StaticResolver {
    fn resolve(&self, service: &str) -> Result<Endpoint, ResolveError> {
        self.endpoints
            .get(service)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownService(service.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, address: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            address: address.to_string(),
        }
    }

    #[test]
    fn resolves_registered_service() {
        let resolver =
            StaticResolver::from_config(&[service("account", "127.0.0.1:8080")]).unwrap();
        let endpoint = resolver.resolve("account").unwrap();
        assert_eq!(endpoint.base_url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn unknown_service_is_an_error() {
        let resolver = StaticResolver::from_config(&[]).unwrap();
        assert!(matches!(
            resolver.resolve("ghost"),
            Err(ResolveError::UnknownService(name)) if name == "ghost"
        ));
    }

    #[test]
    fn invalid_address_fails_at_startup() {
        let errors =
            StaticResolver::from_config(&[service("account", "not a host")]).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidServiceAddress { service, .. }] if service == "account"
        ));
    }
}
