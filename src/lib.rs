//! mkhttps: a local HTTPS front for a plain HTTP upstream.
//!
//! ```text
//!   client ──TLS──▶ http::server ──▶ http::forward ──HTTP──▶ upstream
//!                        ▲                 │
//!                        │          security::headers
//!                   net::tls ◀── net::identity (~/.config/mkhttps.{cert,pem})
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod security;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::{Shutdown, StartupError};
