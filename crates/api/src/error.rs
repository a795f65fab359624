// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use adminkit_persistence::PersistenceError;
use tracing::error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from persistence errors and represent the API
/// contract. Internal details never reach the client; they are logged where
/// the error is translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No authenticated actor.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// The message shown to the client.
        message: String,
    },
}

impl ApiError {
    /// Returns the text placed in the response body's `error` field.
    #[must_use]
    pub fn client_message(&self) -> &str {
        match self {
            Self::AuthenticationFailed { .. } => "Unauthorized",
            Self::Unauthorized { .. } => "Forbidden",
            Self::InvalidInput { message, .. } | Self::Internal { message } => message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a persistence error into an API error.
///
/// Validation failures keep their message so the client can see which
/// fields were missing. Every other failure is logged and replaced by
/// `client_message`.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError, client_message: &str) -> ApiError {
    match err {
        PersistenceError::Validation(validation) => ApiError::InvalidInput {
            field: String::from("activity"),
            message: validation.to_string(),
        },
        other => {
            error!(error = %other, "{client_message}");
            ApiError::Internal {
                message: client_message.to_string(),
            }
        }
    }
}
