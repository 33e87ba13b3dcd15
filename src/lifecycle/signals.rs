//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM/SIGINT handlers (async-safe via Tokio)
//! - Translate the first signal into a `shutdown` request
//!
//! # Design Decisions
//! - Signal wiring lives in the hosting binary, not inside the server; an
//!   embedded instance may never want OS signals at all

use std::sync::Arc;

use tokio::signal;

use crate::http::HttpServer;

/// Wait for SIGTERM or Ctrl+C, then request a graceful shutdown.
///
/// Intended to be spawned alongside `server.start()`. A misuse error from
/// `shutdown` (signal raced the startup) is logged, not propagated.
pub async fn shutdown_on_signal(server: Arc<HttpServer>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down gracefully");
        }
        _ = terminate => {
            tracing::info!("received terminate signal, shutting down gracefully");
        }
    }

    if let Err(error) = server.shutdown() {
        tracing::warn!(%error, "shutdown request rejected");
    }
}
