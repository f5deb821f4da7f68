//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (drop Forwarded / X-Forwarded-*)
//!     → Pass to forwarder
//! ```
//!
//! # Design Decisions
//! - No trust in client-supplied proxy-chain metadata

pub mod headers;

pub use headers::{filter_request_headers, BLOCKED_REQUEST_HEADERS};
