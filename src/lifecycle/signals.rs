//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Trigger `shutdown` on Ctrl+C.
pub async fn shutdown_on_ctrl_c(shutdown: &Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => shutdown.trigger(),
        Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
