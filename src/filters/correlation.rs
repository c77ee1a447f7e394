//! Correlation id handling at the edge.
//!
//! # Responsibilities
//! - Carry an inbound correlation id through to the backend unmodified
//! - Generate one at the edge when the client did not send one
//!
//! # Design Decisions
//! - The id is never rewritten once present; downstream hops can rely on it
//! - Generated ids are UUID v4

use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

/// Header carrying the correlation id across every hop.
pub const CORRELATION_ID: &str = "eazybank-correlation-id";

/// Ensure the request carries a correlation id, generating one if absent.
///
/// Returns the id in effect for request-scoped logging.
pub fn ensure_correlation_id(headers: &mut HeaderMap) -> String {
    if let Some(existing) = headers.get(CORRELATION_ID).and_then(|v| v.to_str().ok()) {
        return existing.to_string();
    }

    let generated = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&generated) {
        headers.insert(CORRELATION_ID, value);
    }
    generated
}
