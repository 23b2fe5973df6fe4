//! Configuration management for the todo server.
//!
//! Settings come from, in increasing precedence: built-in defaults, an
//! optional `todo-server.yaml` file, environment variables, and finally the
//! server's command-line flags.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file path relative to the working directory.
pub const CONFIG_FILE_PATH: &str = "todo-server.yaml";

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default origin allowed by CORS.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Default store file for the JSON backend.
pub const DEFAULT_STORE_PATH: &str = "db.json";

/// Default database file for the `SQLite` backend.
pub const DEFAULT_SQLITE_PATH: &str = "todos.sqlite3";

/// Default log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "todo_store=info,tower_http=info";

/// Which record store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Flat JSON file.
    #[default]
    Json,
    /// `SQLite` database file.
    Sqlite,
    /// Process memory; nothing is persisted.
    Memory,
}

impl StoreBackend {
    /// Get the string representation of the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }

    /// Get the file used when no store path is configured.
    #[must_use]
    pub const fn default_path(&self) -> &'static str {
        match self {
            Self::Json | Self::Memory => DEFAULT_STORE_PATH,
            Self::Sqlite => DEFAULT_SQLITE_PATH,
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(format!(
                "invalid store backend: '{s}' (must be one of: json, sqlite, memory)"
            )),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("invalid log format: '{s}' (must be text or json)")),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to use.
    pub backend: StoreBackend,
    /// Path of the store file; the backend's default when unset. Ignored
    /// by the memory backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Write an empty store at startup if the file does not exist.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Get the configured store path, or the backend's default.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(self.backend.default_path()))
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// `tracing_subscriber` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: LogFormat::default(), filter: DEFAULT_LOG_FILTER.to_string() }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: SocketAddr,
    /// The single origin allowed by CORS.
    pub allowed_origin: String,
    /// Record store settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            store: StoreConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load the configuration: an explicit file if given (which must exist),
    /// otherwise `todo-server.yaml` if present, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::read(path)?,
            None => Self::load_from(Path::new(CONFIG_FILE_PATH))?.unwrap_or_default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load config from a file, returning None if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up by variable name.
    ///
    /// Recognised names: `TODO_BIND`, `TODO_ALLOWED_ORIGIN`,
    /// `TODO_STORE_BACKEND`, `TODO_STORE_PATH`, `LOG_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("TODO_BIND") {
            self.bind = bind
                .parse()
                .map_err(|e| Error::Config(format!("TODO_BIND '{bind}': {e}")))?;
        }
        if let Some(origin) = lookup("TODO_ALLOWED_ORIGIN") {
            self.allowed_origin = origin;
        }
        if let Some(backend) = lookup("TODO_STORE_BACKEND") {
            self.store.backend = backend.parse().map_err(Error::Config)?;
        }
        if let Some(path) = lookup("TODO_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = format.parse().map_err(Error::Config)?;
        }
        Ok(())
    }
}
