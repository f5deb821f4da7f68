//! TLS configuration for the listener.
//!
//! The handshake itself belongs to axum-server; this only turns the
//! PEM identity on disk into a rustls server config.

use std::io::{Error, ErrorKind};
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

fn require_file(path: &Path, what: &str) -> Result<(), Error> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::NotFound,
            format!("{} not found: {}", what, path.display()),
        ))
    }
}

/// Build the rustls config from the certificate and key PEM files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, Error> {
    require_file(cert_path, "certificate file")?;
    require_file(key_path, "private key file")?;

    let config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::debug!(cert_path = %cert_path.display(), "TLS identity loaded");
    Ok(config)
}
