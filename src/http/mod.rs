//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     -> server.rs (Axum setup, middleware stack)
//!     -> gateway handler (route match, breaker gate, rewrite)
//!     -> upstream forwarder or fallback
//!     -> response filters (diagnostic header)
//!     -> Send to client
//! ```

pub mod server;

pub use server::{GatewayState, HttpServer};
