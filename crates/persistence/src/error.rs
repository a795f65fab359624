// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_audit::ValidationError;

use crate::config::ConfigError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database could not be reached, or rejected the credentials.
    ConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// The activity draft failed validation. No I/O was attempted.
    Validation(ValidationError),
    /// The stored configuration is missing, unreadable or invalid.
    Configuration(ConfigError),
    /// A statement was executed with the wrong number of parameters.
    ParameterMismatch {
        /// Placeholders in the statement.
        expected: usize,
        /// Parameters supplied.
        actual: usize,
    },
    /// A stored row could not be decoded.
    CorruptRow {
        /// The row's id.
        id: String,
        /// What was wrong with it.
        message: String,
    },
    /// Serialization/deserialization error.
    Serialization(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "Database connection failed: {msg}"),
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Configuration(err) => write!(f, "Configuration error: {err}"),
            Self::ParameterMismatch { expected, actual } => {
                write!(
                    f,
                    "Statement expects {expected} parameters but {actual} were supplied"
                )
            }
            Self::CorruptRow { id, message } => {
                write!(f, "Activity row '{id}' is corrupt: {message}")
            }
            Self::Serialization(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::ConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<ValidationError> for PersistenceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ConfigError> for PersistenceError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err)
    }
}
