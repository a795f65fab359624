// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The persisted application configuration.
//!
//! The configuration is a single JSON document:
//!
//! ```json
//! {
//!   "setupComplete": true,
//!   "databaseConfig": { "type": "embedded", "path": "./data/app.db" }
//! }
//! ```
//!
//! It is written by the setup flow and read on every audit call, so a saved
//! reconfiguration takes effect on the next call without a restart.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::gate::SetupCheck;

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        message: String,
    },
    /// The configuration file is not valid JSON of the expected shape.
    Malformed {
        /// The file involved.
        path: PathBuf,
        /// The parse error.
        message: String,
    },
    /// No database has been configured.
    MissingDescriptor,
    /// The backend descriptor is incomplete.
    InvalidDescriptor(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "Cannot access configuration {}: {message}", path.display())
            }
            Self::Malformed { path, message } => {
                write!(f, "Malformed configuration {}: {message}", path.display())
            }
            Self::MissingDescriptor => write!(f, "Database configuration not found"),
            Self::InvalidDescriptor(msg) => write!(f, "Invalid database configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The two families of storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// A single database file opened in-process.
    Embedded,
    /// A networked database server.
    ClientServer,
}

const fn default_port() -> u16 {
    5432
}

/// Where and how to reach the activity database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendDescriptor {
    /// An embedded `SQLite` database file.
    #[serde(rename = "embedded", alias = "sqlite")]
    Embedded {
        /// Path to the database file.
        path: PathBuf,
    },
    /// A `PostgreSQL` server.
    #[serde(rename = "client-server", alias = "postgresql")]
    ClientServer {
        /// Server host name or address.
        host: String,
        /// Server port.
        #[serde(default = "default_port")]
        port: u16,
        /// Database name.
        database: String,
        /// Login role.
        username: String,
        /// Login password.
        #[serde(default)]
        password: String,
        /// Schema placed first on the search path.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schema: Option<String>,
        /// Whether to require TLS.
        #[serde(default)]
        ssl: bool,
    },
}

impl BackendDescriptor {
    /// Returns which family of engine this descriptor addresses.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Embedded { .. } => BackendKind::Embedded,
            Self::ClientServer { .. } => BackendKind::ClientServer,
        }
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let blank = |field: &str| ConfigError::InvalidDescriptor(format!("{field} is required"));
        match self {
            Self::Embedded { path } => {
                if path.as_os_str().is_empty() {
                    return Err(blank("path"));
                }
            }
            Self::ClientServer {
                host,
                port,
                database,
                username,
                ..
            } => {
                if host.trim().is_empty() {
                    return Err(blank("host"));
                }
                if *port == 0 {
                    return Err(ConfigError::InvalidDescriptor(String::from(
                        "port must be between 1 and 65535",
                    )));
                }
                if database.trim().is_empty() {
                    return Err(blank("database"));
                }
                if username.trim().is_empty() {
                    return Err(blank("username"));
                }
            }
        }
        Ok(())
    }

    /// Returns whether the backend looks usable without opening a
    /// connection.
    ///
    /// For an embedded database the directory that will hold the file must
    /// exist. Client-server backends cannot be checked without network I/O
    /// and are assumed reachable.
    #[must_use]
    pub fn is_locally_reachable(&self) -> bool {
        match self {
            Self::Embedded { path } => match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
                _ => true,
            },
            Self::ClientServer { .. } => true,
        }
    }
}

/// The persisted application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Whether the one-time setup flow has finished.
    #[serde(default)]
    pub setup_complete: bool,
    /// The active database, once configured.
    #[serde(default)]
    pub database_config: Option<BackendDescriptor>,
}

/// Supplies the backend descriptor in effect at call time.
pub trait DescriptorSource: Send + Sync {
    /// Returns the current descriptor, or `None` if none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read.
    fn descriptor(&self) -> Result<Option<BackendDescriptor>, ConfigError>;
}

/// Reads and writes [`AppConfig`] as a JSON file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the configuration file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if the file does not exist
    /// * `Ok(Some(config))` otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<AppConfig>, ConfigError> {
        let text: String = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No configuration file");
                return Ok(None);
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ConfigError::Malformed {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    /// Saves the configuration, creating parent directories as needed.
    ///
    /// Callers that change `setupComplete` or the descriptor must invalidate
    /// the setup gate afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let io_error = |e: std::io::Error| ConfigError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let text: String =
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Malformed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        fs::write(&self.path, text).map_err(io_error)?;
        info!(
            path = %self.path.display(),
            setup_complete = config.setup_complete,
            "Configuration saved"
        );
        Ok(())
    }
}

impl DescriptorSource for ConfigStore {
    fn descriptor(&self) -> Result<Option<BackendDescriptor>, ConfigError> {
        Ok(self.load()?.and_then(|config| config.database_config))
    }
}

impl SetupCheck for ConfigStore {
    fn is_setup_complete(&self) -> Result<bool, ConfigError> {
        let Some(config) = self.load()? else {
            return Ok(false);
        };
        if !config.setup_complete {
            return Ok(false);
        }
        let Some(descriptor) = config.database_config else {
            return Ok(false);
        };
        descriptor.validate()?;
        Ok(descriptor.is_locally_reachable())
    }
}
