//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! argv (two positionals + optional flags)
//!     → args.rs (clap parse, usage errors)
//!     → loader.rs (optional TOML base, positional override)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → passed by reference to identity bootstrap and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::{Args, ArgsError, USAGE};
pub use loader::{config_from_args, load_config, ConfigError};
pub use schema::{IdentityConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig};
pub use validation::ValidationError;
