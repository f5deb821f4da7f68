//! Inbound header sanitization.
//!
//! # Responsibilities
//! - Strip proxy-chain headers a client could forge (Forwarded, X-Forwarded-*)
//! - Pass every other header through unchanged
//!
//! # Design Decisions
//! - Never trust existing X-Forwarded-* from the client
//! - Blocked headers are dropped, not rewritten
//! - `HeaderName` is lowercase, so wire-level case variants all match

use axum::http::header::{self, HeaderMap, HeaderName};

/// Headers never forwarded upstream.
pub static BLOCKED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::FORWARDED,
    HeaderName::from_static("x-forwarded-for"),
    HeaderName::from_static("x-forwarded-host"),
    HeaderName::from_static("x-forwarded-proto"),
];

/// Whether `name` is one of [`BLOCKED_REQUEST_HEADERS`].
pub fn is_blocked(name: &HeaderName) -> bool {
    BLOCKED_REQUEST_HEADERS.contains(name)
}

/// Copy of `headers` without the blocked entries.
pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if is_blocked(name) {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}
