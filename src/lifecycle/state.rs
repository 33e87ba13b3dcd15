//! Server lifecycle states and the atomic cell guarding them.
//!
//! # Design Decisions
//! - States carry a total order; a transition is legal only if it moves
//!   strictly forward
//! - Enforcement lives in one place (`StateCell::advance`) rather than at
//!   every call site

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::ServerError;

/// The four lifecycle states of a server instance.
///
/// The sequence observed over any execution is a subsequence of
/// `Ready, Live, ShuttingDown, ShutDown`; no transition ever moves backward
/// and `ShutDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ServerState {
    /// Constructed: router and transport exist, nothing is serving yet.
    Ready = 0,
    /// Accepting work; the start caller is blocked on the shutdown signal.
    Live = 1,
    /// Drain in progress.
    ShuttingDown = 2,
    /// Terminal: transport closed, signal delivered.
    ShutDown = 3,
}

impl ServerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ServerState::Ready,
            1 => ServerState::Live,
            2 => ServerState::ShuttingDown,
            _ => ServerState::ShutDown,
        }
    }
}

/// Lock-free holder of the current lifecycle state.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    /// A fresh cell in the `Ready` state.
    pub fn new() -> Self {
        Self(AtomicU8::new(ServerState::Ready as u8))
    }

    /// The state at this instant. May be stale by the time the caller acts
    /// on it; decisions that must be exact go through [`StateCell::advance`].
    pub fn current(&self) -> ServerState {
        ServerState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Move forward to `to`, failing if that would not be a strictly
    /// monotonic step from the state observed at the moment of the swap.
    pub fn advance(&self, to: ServerState) -> Result<(), ServerError> {
        let mut observed = self.0.load(Ordering::SeqCst);
        loop {
            let from = ServerState::from_u8(observed);
            if from >= to {
                return Err(ServerError::InvalidTransition { from, to });
            }
            match self.0.compare_exchange(
                observed,
                to as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => observed = actual,
            }
        }
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
