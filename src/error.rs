//! Error types for server construction and lifecycle operations.

use thiserror::Error;

use crate::config::{ConfigError, ExecutionMode};
use crate::lifecycle::state::ServerState;

/// Errors surfaced by the server component.
///
/// Construction and bind failures propagate to the direct caller. Everything
/// else that happens during shutdown is absorbed and logged where it occurs;
/// the only value crossing the `start` suspension boundary is the final
/// shutdown outcome.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound during init. Fatal; no partial state
    /// is retained.
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    /// The serve loop terminated with a genuine I/O failure (as opposed to
    /// the expected closed condition after a normal drain).
    #[error("listener failed: {0}")]
    Serve(#[source] std::io::Error),

    /// `start` was called a second time, or a registration arrived after the
    /// router had already been frozen.
    #[error("server already started")]
    AlreadyStarted,

    /// `shutdown` (or a harness client request) arrived before `start`.
    #[error("server not started")]
    NotStarted,

    /// A lifecycle transition would have moved backwards.
    #[error("invalid lifecycle transition: {from:?} -> {to:?}")]
    InvalidTransition { from: ServerState, to: ServerState },

    /// In-flight requests did not finish within the drain timeout and the
    /// listener was force-closed.
    #[error("graceful drain timed out, listener force-closed")]
    DrainTimedOut,

    /// The shutdown signal producer went away without delivering an outcome.
    #[error("shutdown signal dropped before completion")]
    SignalLost,

    /// The wrong execution mode for the requested operation (e.g. asking a
    /// live server for an in-process harness client).
    #[error("operation not available in {0:?} mode")]
    WrongMode(ExecutionMode),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
