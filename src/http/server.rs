//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single forwarding rule
//! - Wire up middleware (tracing)
//! - Serve over TLS on the configured address
//! - Drain in-flight requests on shutdown

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{ProxyConfig, ValidationError};
use crate::http::forward::{proxy_handler, ForwardState};

/// How long in-flight requests may run after shutdown is requested.
const DRAIN_PERIOD: Duration = Duration::from_secs(10);

/// HTTPS front for the upstream.
pub struct HttpServer {
    router: Router,
    bind_address: SocketAddr,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self, ValidationError> {
        let upstream = config.upstream_authority()?;
        let bind_address = config.bind_socket_addr()?;

        let router = Self::build_router(ForwardState::new(upstream));
        Ok(Self { router, bind_address })
    }

    /// Every method on every path goes to the forwarder.
    fn build_router(state: ForwardState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving without TLS.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Configured listen address.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Serve TLS connections until `shutdown` fires.
    ///
    /// `handle` reports the bound address once listening.
    pub async fn run(
        self,
        tls: RustlsConfig,
        handle: Handle,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %self.bind_address, "Listening");

        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(DRAIN_PERIOD));
        });

        axum_server::bind_rustls(self.bind_address, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
