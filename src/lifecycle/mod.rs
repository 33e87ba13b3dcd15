//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Init:
//!     Build router façade → Choose transport → Ready
//!
//! Start (state.rs gates the transition):
//!     Ready → Live → publish Initialized → block on shutdown signal
//!
//! Shutdown (shutdown.rs):
//!     Live → ShuttingDown → drain within timeout → ShutDown
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → server.shutdown()
//! ```
//!
//! # Design Decisions
//! - State is strictly monotonic, enforced with an atomic CAS loop
//! - Exactly one shutdown request drives the drain; the rest are no-ops
//! - The drain timeout is a module constant, not caller-adjustable

pub mod shutdown;
pub mod signals;
pub mod state;
