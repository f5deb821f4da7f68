//! Configuration loading from disk and command line.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::args::Args;
use crate::config::schema::{IdentityConfig, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Why a startup configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a TOML file without validating it.
fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the startup configuration from parsed arguments.
///
/// The optional file supplies the base; positional values and flags win.
pub fn config_from_args(args: &Args) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    config.upstream.host = args.upstream.clone();
    config.listener.bind_address = args.listen.clone();
    if let Some(dir) = &args.config_dir {
        config.identity = IdentityConfig::in_dir(dir);
    }
    if let Some(level) = &args.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
