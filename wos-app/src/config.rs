//! Application settings read from a TOML file.
//!
//! ```toml
//! log_level = "info"
//! log_file = "wos.log"
//! autosave_delay_ms = 500
//!
//! [store]
//! backend = "sqlite"
//! connection_string = "wos.db"
//!
//! [catalog]
//! items = "my-items.csv"
//! goals = "my-goals.csv"
//! ```
//!
//! Every key is optional. A missing file yields [`AppConfig::default`].

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wos_core::store::{DEFAULT_AUTOSAVE_DELAY, StoreConfig};

pub const DEFAULT_CONFIG_FILE: &str = "wos.toml";
pub const DEFAULT_DATABASE_FILE: &str = "wos.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("invalid config file '{path}': {reason}")]
    Parse { path: String, reason: String },
}

/// Extra catalog files layered over the built-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub items: Option<PathBuf>,
    pub goals: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub autosave_delay_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub catalog: CatalogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: "sqlite".to_string(),
                connection_string: DEFAULT_DATABASE_FILE.to_string(),
            },
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY.as_millis() as u64,
            log_level: "info".to_string(),
            log_file: None,
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map_err(|reason| ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io {
                path: path.display().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Applies command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        backend: Option<String>,
        connection_string: Option<String>,
        log_level: Option<String>,
    ) -> Self {
        if let Some(backend) = backend {
            self.store.backend = backend;
        }
        if let Some(connection_string) = connection_string {
            self.store.connection_string = connection_string;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
        self
    }
}
