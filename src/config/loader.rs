//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{ServerConfig, PORT_ENV_VAR};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A port value that is not a valid u16.
    InvalidPort(String),
    /// An execution mode string outside `live` / `test`.
    UnknownMode(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidPort(raw) => write!(f, "Invalid port value: {:?}", raw),
            ConfigError::UnknownMode(raw) => write!(f, "Unknown execution mode: {:?}", raw),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file, then apply the environment override
/// for the listen port.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ServerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    if let Ok(raw) = std::env::var(PORT_ENV_VAR) {
        config.port = raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw))?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;

    #[test]
    fn test_load_config_from_file() {
        let dir = std::env::temp_dir().join("http-host-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("server.toml");
        std::fs::write(&path, "port = 9191\nmode = \"test\"").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.port, 9191);
        assert_eq!(config.mode, ExecutionMode::Test);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/server.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
