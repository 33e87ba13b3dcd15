//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;

/// Default listen port when neither file nor environment supplies one.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable overriding the listen port.
pub const PORT_ENV_VAR: &str = "HTTP_SERVER_PORT";

/// Immutable server configuration, read once at init.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port for the live transport.
    pub port: u16,

    /// Execution mode selecting the transport variant.
    pub mode: ExecutionMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: ExecutionMode::Live,
        }
    }
}

impl ServerConfig {
    /// Build a configuration for the given mode, taking the port from the
    /// `HTTP_SERVER_PORT` environment variable when set.
    ///
    /// A present-but-unparseable port is a hard error rather than a silent
    /// fall back to the default.
    pub fn from_env(mode: ExecutionMode) -> Result<Self, ConfigError> {
        let port = match std::env::var(PORT_ENV_VAR) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self { port, mode })
    }

    /// Build a configuration with an explicit port.
    pub fn with_port(port: u16, mode: ExecutionMode) -> Self {
        Self { port, mode }
    }
}

/// Execution mode distinguishing production operation from in-process
/// testing. Exactly two modes exist; anything else fails at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Bind a real TCP listener and serve network traffic.
    Live,
    /// Construct an in-process harness; no socket is opened.
    Test,
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(ExecutionMode::Live),
            "test" => Ok(ExecutionMode::Test),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Live => write!(f, "live"),
            ExecutionMode::Test => write!(f, "test"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.mode, ExecutionMode::Live);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("live".parse::<ExecutionMode>().unwrap(), ExecutionMode::Live);
        assert_eq!("Test".parse::<ExecutionMode>().unwrap(), ExecutionMode::Test);
        assert!("staging".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn test_mode_from_toml() {
        let config: ServerConfig = toml::from_str("port = 9090\nmode = \"test\"").unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.mode, ExecutionMode::Test);
    }

    #[test]
    fn test_unknown_mode_rejected_in_toml() {
        let parsed: Result<ServerConfig, _> = toml::from_str("mode = \"staging\"");
        assert!(parsed.is_err());
    }
}
