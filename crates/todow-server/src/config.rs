//! Server configuration
//!
//! Built once at startup from built-in defaults, an optional TOML file and
//! command-line overrides, in that order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use todow_core::Credentials;

/// Default listen address (all interfaces, port 9999)
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9999";

/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "todos.db";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub listen_addr: String,
    /// Path of the database file
    pub db_path: PathBuf,
    /// Basic auth credentials required on every route
    pub credentials: Credentials,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            credentials: Credentials::default(),
        }
    }
}

/// Values given on the command line, each replacing the configured one
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen_addr: Option<String>,
    pub db_path: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Errors loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(addr) = overrides.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(path) = overrides.db_path {
            self.db_path = path;
        }
        if let Some(user) = overrides.username {
            self.credentials.username = user;
        }
        if let Some(pass) = overrides.password {
            self.credentials.password = pass;
        }
        self
    }
}
