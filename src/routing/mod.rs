//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (during Ready):
//!     verb/pattern/middleware calls
//!     → facade.rs (journal + forward to axum::Router)
//!
//! Freeze (at start):
//!     RouterFacade::into_router()
//!     → apply deferred middleware, first registered outermost
//!     → immutable axum::Router handed to the transport
//! ```
//!
//! # Design Decisions
//! - Registrations are forwarded in the exact order and with the exact
//!   arguments received; match semantics belong to axum
//! - One shared journal/logging path instead of per-method log statements
//! - Middleware application is deferred so registration order equals
//!   outer-to-inner wrapping order

pub mod facade;

pub use facade::{RouteEntry, RouterFacade};
