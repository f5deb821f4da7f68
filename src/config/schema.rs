//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use axum::http::uri::Authority;
use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;

/// File name of the PEM certificate inside the config directory.
pub const CERT_FILE_NAME: &str = "mkhttps.cert";

/// File name of the PEM private key inside the config directory.
pub const KEY_FILE_NAME: &str = "mkhttps.pem";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Location of the self-signed TLS identity.
    pub identity: IdentityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Parse the configured upstream into a URI authority.
    pub fn upstream_authority(&self) -> Result<Authority, ValidationError> {
        let host = self.upstream.host.trim();
        if host.is_empty() {
            return Err(ValidationError::MissingUpstream);
        }
        let authority = Authority::from_str(host)
            .map_err(|e| ValidationError::InvalidUpstream(host.to_string(), e.to_string()))?;
        if authority.as_str().contains('@') {
            return Err(ValidationError::InvalidUpstream(
                host.to_string(),
                "userinfo is not allowed".to_string(),
            ));
        }
        Ok(authority)
    }

    /// Parse the configured bind address.
    pub fn bind_socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        self.listener
            .bind_address
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ValidationError::InvalidBindAddress(
                    self.listener.bind_address.clone(),
                    e.to_string(),
                )
            })
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address for incoming TLS connections (e.g., "127.0.0.1:8443").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8443".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// host[:port] of the upstream, reached over plain HTTP.
    pub host: String,
}

/// TLS identity file locations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Path to the PEM certificate.
    pub cert_path: PathBuf,

    /// Path to the PEM private key. Its existence marks the identity as bootstrapped.
    pub key_path: PathBuf,
}

impl IdentityConfig {
    /// Identity files placed inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cert_path: dir.join(CERT_FILE_NAME),
            key_path: dir.join(KEY_FILE_NAME),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self::in_dir(&default_config_dir())
    }
}

/// `$HOME/.config`, or `.config` relative to the working directory when HOME is unset.
pub fn default_config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".config")
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
