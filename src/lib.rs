//! EazyBank Edge Gateway Library

pub mod config;
pub mod filters;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
