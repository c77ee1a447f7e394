//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     -> loader.rs (parse & deserialize)
//!     -> validation.rs (semantic checks)
//!     -> GatewayConfig (validated, immutable)
//!     -> compiled into routes/resolver at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the process lifetime; changes require restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Every semantic error is fatal at startup, never a per-request condition

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::RouteConfig;
pub use schema::ServiceConfig;
pub use schema::TimeoutConfig;
