//! HTTP server component.
//!
//! # Data Flow
//! ```text
//! init:
//!     ServerConfig + EventBus
//!     → routing façade (live mode: request-logging middleware)
//!     → transport (live: bound listener / test: unstarted harness)
//!     → Ready
//!
//! start (blocks):
//!     freeze façade → go Live → publish Initialized
//!     → suspend on the one-shot shutdown signal
//!
//! shutdown (returns immediately):
//!     spawn coordinator → drain → notify → release start
//! ```

pub mod server;

pub use server::HttpServer;
