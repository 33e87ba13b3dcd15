//! Transport subsystem.
//!
//! # Design Decisions
//! - Live vs. test delivery is a sum type with exactly one populated
//!   variant, chosen once at init and never changed
//! - The in-process harness never opens a socket; requests are dispatched
//!   straight into the router as a tower service

pub mod transport;

pub use transport::{Harness, HarnessClient, Transport};
