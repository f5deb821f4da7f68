//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! startup, identity bootstrap, per-request forwarding
//!     → tracing events (`--> METHOD URI`, `<-- STATUS`, errors)
//!     → logging.rs subscriber (fmt layer, stdout)
//! ```

pub mod logging;
