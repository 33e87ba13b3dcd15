//! Embeddable HTTP server component with a managed lifecycle.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌───────────────────────────────────────────────┐
//!                   │                  HTTP HOST                    │
//!                   │                                               │
//!   registrations   │  ┌──────────┐       ┌──────────────────────┐ │
//!   ────────────────┼─▶│ routing  │──────▶│    axum::Router      │ │
//!   (before start)  │  │  façade  │       │  (frozen at start)   │ │
//!                   │  └──────────┘       └──────────┬───────────┘ │
//!                   │                                │             │
//!                   │               ┌────────────────┴───────────┐ │
//!   requests        │  ┌────────────▼─────┐   ┌─────────────────▼┐│
//!   ────────────────┼─▶│ net::Network     │   │ net::InProcess   ││
//!   (one transport) │  │ (TCP listener)   │   │ (test harness)   ││
//!                   │  └──────────────────┘   └──────────────────┘│
//!                   │                                             │
//!                   │  ┌─────────────────────────────────────────┐│
//!                   │  │          Cross-Cutting Concerns         ││
//!                   │  │  ┌────────┐ ┌────────┐ ┌─────────────┐  ││
//!                   │  │  │ config │ │ events │ │observability│  ││
//!                   │  │  └────────┘ └────────┘ └─────────────┘  ││
//!                   │  │  ┌────────────────────────────────────┐ ││
//!                   │  │  │ lifecycle: Ready → Live →          │ ││
//!                   │  │  │            ShuttingDown → ShutDown │ ││
//!                   │  │  └────────────────────────────────────┘ ││
//!                   │  └─────────────────────────────────────────┘│
//!                   └───────────────────────────────────────────────┘
//! ```
//!
//! The server owns its router and transport exclusively. Collaborators are
//! injected at construction: an [`events::EventBus`] for lifecycle
//! notifications and a [`config::ServerConfig`] carrying the listen port and
//! execution mode. One caller blocks in [`http::HttpServer::start`]; any task
//! may request [`http::HttpServer::shutdown`], and exactly one such request
//! drives the coordinated drain.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod events;
pub mod lifecycle;
pub mod observability;

pub use config::{ExecutionMode, ServerConfig};
pub use error::ServerError;
pub use events::{EventBus, EventSubscriber, ServerEvent};
pub use http::HttpServer;
pub use lifecycle::state::ServerState;
