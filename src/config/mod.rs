//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (optional)
//!     → loader.rs (parse, validate)
//!     → schema.rs (ServerConfig)
//!     → env override (HTTP_SERVER_PORT)
//!     → Freeze: immutable after construction
//! ```
//!
//! # Design Decisions
//! - Config is read once at init and never mutated afterwards
//! - Unknown execution modes fail at parse time, never default silently
//! - Environment beats file for the listen port

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{ExecutionMode, ServerConfig, DEFAULT_PORT, PORT_ENV_VAR};
