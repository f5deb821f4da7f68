//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → identity.rs (create self-signed key + cert once)
//!     → tls.rs (load PEM files into a rustls config)
//!     → Hand off to HTTP layer (axum-server performs the handshake)
//! ```

pub mod identity;
pub mod tls;

pub use identity::{ensure_identity, IdentityError, IdentityStatus};
pub use tls::load_tls_config;
