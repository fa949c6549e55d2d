//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Trigger `shutdown` when Ctrl+C is received.
pub fn trigger_on_ctrl_c(shutdown: Shutdown) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Ctrl+C received");
        shutdown.trigger();
    });
}
