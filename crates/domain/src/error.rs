// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Activity type is not one of the closed set of audit verbs.
    InvalidActivityType(String),
    /// Role is not one of the supported user roles.
    InvalidRole(String),
    /// Bulk intent is not one of the supported bulk operations.
    InvalidBulkIntent(String),
    /// A required parameter for a bulk operation is missing.
    MissingBulkParameter {
        /// The bulk intent being constructed.
        intent: &'static str,
        /// The missing parameter name.
        parameter: &'static str,
    },
    /// A user identifier is empty or blank.
    InvalidUserId(String),
    /// A timestamp could not be parsed or formatted.
    InvalidTimestamp(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidActivityType(value) => {
                write!(
                    f,
                    "Invalid activity type '{value}': expected one of create, edit, delete, ban, unban"
                )
            }
            Self::InvalidRole(value) => {
                write!(f, "Invalid role '{value}': expected 'admin' or 'user'")
            }
            Self::InvalidBulkIntent(value) => write!(f, "Unsupported bulk intent '{value}'"),
            Self::MissingBulkParameter { intent, parameter } => {
                write!(f, "Bulk intent '{intent}' requires parameter '{parameter}'")
            }
            Self::InvalidUserId(value) => write!(f, "Invalid user id: '{value}'"),
            Self::InvalidTimestamp(msg) => write!(f, "Invalid timestamp: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
