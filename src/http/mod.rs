//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (axum-server)
//!     → server.rs (Axum router, single fallback route)
//!     → forward.rs (filter headers, rewrite URI, dispatch upstream)
//!     → stream upstream response back to the client
//! ```

pub mod forward;
pub mod server;

pub use forward::{ForwardError, ForwardState};
pub use server::HttpServer;
