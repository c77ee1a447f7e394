//! Outbound response header injection.
//!
//! # Responsibilities
//! - Stamp the diagnostic response-time header on every outbound response
//!
//! # Design Decisions
//! - Applied to responses only, never to the inbound request
//! - The timestamp is computed at stamping time, not cached from request
//!   start, so sequential responses carry non-decreasing values

use axum::http::{HeaderMap, HeaderValue};
use chrono::{SecondsFormat, Utc};

/// Diagnostic header carrying the wall-clock time the response left the gateway.
pub const X_RESPONSE_TIME: &str = "x-response-time";

/// Stamp the response-time header with the current wall-clock time.
pub fn stamp_response_time(headers: &mut HeaderMap) {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    if let Ok(value) = HeaderValue::from_str(&now) {
        headers.insert(X_RESPONSE_TIME, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn stamps_parseable_timestamp() {
        let mut headers = HeaderMap::new();
        stamp_response_time(&mut headers);
        let value = headers.get(X_RESPONSE_TIME).unwrap().to_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(value).is_ok());
    }

    #[test]
    fn sequential_stamps_are_non_decreasing() {
        let mut first = HeaderMap::new();
        stamp_response_time(&mut first);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut second = HeaderMap::new();
        stamp_response_time(&mut second);

        let parse = |headers: &HeaderMap| {
            DateTime::parse_from_rfc3339(
                headers.get(X_RESPONSE_TIME).unwrap().to_str().unwrap(),
            )
            .unwrap()
        };
        assert!(parse(&second) >= parse(&first));
    }

    #[test]
    fn restamping_overwrites_previous_value() {
        let mut headers = HeaderMap::new();
        headers.insert(X_RESPONSE_TIME, HeaderValue::from_static("stale"));
        stamp_response_time(&mut headers);
        assert_ne!(headers.get(X_RESPONSE_TIME).unwrap(), "stale");
    }
}
