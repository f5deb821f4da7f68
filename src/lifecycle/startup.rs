//! Startup orchestration.
//!
//! Order: identity on disk → TLS config → bind and serve. Any failure here
//! is fatal; the process exits before serving a single request.

use axum_server::Handle;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::{ProxyConfig, ValidationError};
use crate::http::HttpServer;
use crate::net::{ensure_identity, load_tls_config, IdentityError};

/// Errors that stop the proxy from ever becoming a trustworthy TLS endpoint.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("TLS identity: {0}")]
    Identity(#[from] IdentityError),

    #[error("loading TLS config: {0}")]
    Tls(#[source] std::io::Error),

    #[error("serving on listen address: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bootstrap the identity and serve until `shutdown` fires.
pub async fn start(
    config: &ProxyConfig,
    handle: Handle,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    let identity = &config.identity;
    ensure_identity(&identity.cert_path, &identity.key_path)?;

    let tls = load_tls_config(&identity.cert_path, &identity.key_path)
        .await
        .map_err(StartupError::Tls)?;

    let server = HttpServer::new(config)?;
    tracing::info!(
        upstream = %config.upstream.host,
        bind_address = %server.bind_address(),
        "Configuration loaded"
    );

    server.run(tls, handle, shutdown).await.map_err(StartupError::Serve)
}
