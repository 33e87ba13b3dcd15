//! Shutdown coordination.
//!
//! # Responsibilities
//! - Drive the `Live → ShuttingDown → ShutDown` sequence exactly once
//! - Bound the graceful drain with a fixed timeout, then force-close
//! - Publish `ShutdownInitiated` / `ShutdownCompleted` best-effort
//! - Deliver the final outcome on the one-shot shutdown signal
//!
//! # Design Decisions
//! - The coordinator runs on its own task; the caller of `shutdown` never
//!   blocks on drain completion
//! - The in-process harness closes immediately (it has no network clients
//!   to drain); only the live listener honors the timeout
//! - A timed-out drain delivers `DrainTimedOut` through the signal rather
//!   than swallowing the forced close

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::ServerError;
use crate::events::{EventBus, ServerEvent};
use crate::lifecycle::state::{ServerState, StateCell};
use crate::net::Transport;

/// Bound on the graceful drain. Fixed; not caller-adjustable.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the coordinator needs, moved out of the server so the
/// sequence owns its resources outright and cannot be driven twice.
pub(crate) struct ShutdownSequence {
    pub state: Arc<StateCell>,
    pub events: Arc<EventBus>,
    /// Resolves the graceful-shutdown future inside the serve loop.
    pub drain_tx: Option<oneshot::Sender<()>>,
    /// The spawned serve loop; absent for the in-process harness.
    pub serve_task: Option<JoinHandle<Result<(), std::io::Error>>>,
    /// One-shot signal releasing the caller blocked in `start`.
    pub done_tx: Option<oneshot::Sender<Result<(), ServerError>>>,
    /// The server's transport slot, force-closed at the end of the drain.
    pub transport: Arc<Mutex<Option<Transport>>>,
}

impl ShutdownSequence {
    /// Run the full coordinated shutdown. Consumes self; a second run is
    /// impossible by construction.
    pub(crate) async fn run(self) {
        if let Err(error) = self.state.advance(ServerState::ShuttingDown) {
            tracing::debug!(%error, "state already past ShuttingDown");
        }
        self.events.publish(ServerEvent::ShutdownInitiated);

        let outcome = match self.serve_task {
            Some(serve_task) => drain_listener(self.drain_tx, serve_task).await,
            // In-process harness: nothing to drain, close immediately.
            None => Ok(()),
        };

        self.events.publish(ServerEvent::ShutdownCompleted);

        if let Some(transport) = self
            .transport
            .lock()
            .expect("transport slot poisoned")
            .as_mut()
        {
            transport.force_close();
        }

        if let Some(done_tx) = self.done_tx {
            if done_tx.send(outcome).is_err() {
                tracing::debug!("start caller went away before shutdown completed");
            }
        }

        if let Err(error) = self.state.advance(ServerState::ShutDown) {
            tracing::debug!(%error, "state already terminal");
        }
        tracing::info!("shutdown complete");
    }
}

/// Request a graceful drain and wait for the serve loop to finish, bounded
/// by [`SHUTDOWN_TIMEOUT`]. On expiry the listener is force-closed by
/// aborting the serve task, which is idempotent.
async fn drain_listener(
    drain_tx: Option<oneshot::Sender<()>>,
    mut serve_task: JoinHandle<Result<(), std::io::Error>>,
) -> Result<(), ServerError> {
    if let Some(tx) = drain_tx {
        // Receiver gone means the serve loop already exited; the join below
        // picks up whatever it left behind.
        let _ = tx.send(());
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut serve_task).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!("listener drained cleanly");
            Ok(())
        }
        Ok(Ok(Err(error))) => {
            // A genuine accept failure, not the expected closed condition
            // (a normal drain surfaces as Ok above).
            tracing::error!(%error, "listener closed unexpectedly");
            Err(ServerError::Serve(error))
        }
        Ok(Err(join_error)) => {
            tracing::error!(%join_error, "serve task failed to join");
            Ok(())
        }
        Err(_elapsed) => {
            tracing::warn!(
                timeout = ?SHUTDOWN_TIMEOUT,
                "in-flight requests did not finish in time, force-closing listener"
            );
            serve_task.abort();
            let _ = serve_task.await;
            Err(ServerError::DrainTimedOut)
        }
    }
}
