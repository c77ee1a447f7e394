//! Per-route request/response filters.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     -> correlation.rs (stamp correlation id if absent)
//!     -> rewrite.rs (inbound path -> backend path)
//!     -> [forwarder issues the backend call]
//!     -> response_headers.rs (stamp diagnostic header on the way back)
//! ```
//!
//! # Design Decisions
//! - Rewrite rules are compiled once at startup; request time only substitutes
//! - Response filters run for fallback responses too, so every reply the
//!   client sees carries the same diagnostics

pub mod correlation;
pub mod response_headers;
pub mod rewrite;

pub use correlation::{ensure_correlation_id, CORRELATION_ID};
pub use response_headers::{stamp_response_time, X_RESPONSE_TIME};
pub use rewrite::{RewriteCompileError, RewriteMismatch, RewriteRule};
