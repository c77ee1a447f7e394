//! Upstream subsystem: everything past the circuit breaker gate.
//!
//! # Data Flow
//! ```text
//! Gate allowed:
//!     -> resolver.rs (logical name -> endpoint)
//!     -> forwarder.rs (single call, timeout, header filtering)
//!     -> response streams back verbatim
//!
//! Gate denied, or the call failed:
//!     -> fallback.rs (local payload, or remote target with a fixed
//!        last-resort payload behind it)
//! ```
//!
//! # Design Decisions
//! - The resolver is a trait seam; discovery/load balancing live outside
//! - The forwarder reports outcomes, the caller owns breaker bookkeeping

pub mod fallback;
pub mod forwarder;
pub mod resolver;

pub use fallback::Fallback;
pub use forwarder::{ForwardError, Forwarder};
pub use resolver::{Endpoint, ResolveError, ServiceResolver, StaticResolver};
