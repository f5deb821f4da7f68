//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ProxyConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream host is required")]
    MissingUpstream,

    #[error("invalid upstream host {0:?}: {1}")]
    InvalidUpstream(String, String),

    #[error("invalid listen address {0:?}: {1}")]
    InvalidBindAddress(String, String),

    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

/// Check every semantic rule and report all failures at once.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.upstream_authority() {
        errors.push(e);
    }
    if let Err(e) = config.bind_socket_addr() {
        errors.push(e);
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstream.host = "127.0.0.1:3000".into();
        config.listener.bind_address = "127.0.0.1:8443".into();
        config
    }

    #[test]
    fn accepts_valid_config() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = valid();
        config.observability.log_level = "DEBUG".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn reports_every_error() {
        let mut config = valid();
        config.upstream.host = String::new();
        config.listener.bind_address = "nope".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], ValidationError::MissingUpstream);
        assert!(matches!(errors[1], ValidationError::InvalidBindAddress(..)));
        assert_eq!(errors[2], ValidationError::InvalidLogLevel("loud".into()));
    }
}
