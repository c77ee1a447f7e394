//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request for a route:
//!     -> circuit_breaker.rs (gate: may the backend be called?)
//!     -> denied: serve fallback, no outbound connection
//!     -> allowed: forward once, report the single outcome back
//! ```
//!
//! # Design Decisions
//! - One breaker per route; breakers never share a lock
//! - No automatic retries: one client request is at most one backend attempt
//! - Every attempt's timeout is the forwarder's concern; the breaker only
//!   classifies outcomes

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerState, CircuitBreaker, Permit};
