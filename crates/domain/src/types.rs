// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of verbs an activity event may carry.
///
/// Serialized in lowercase (`"create"`, `"ban"`, ...) both on the wire and in
/// the `type` column of the activity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// An entity was created.
    Create,
    /// An entity was modified.
    Edit,
    /// An entity was removed.
    Delete,
    /// A user was banned.
    Ban,
    /// A user ban was lifted.
    Unban,
}

impl ActivityType {
    /// All activity types, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Ban,
        Self::Unban,
    ];

    /// Returns the persisted string form of this activity type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Ban => "ban",
            Self::Unban => "unban",
        }
    }
}

impl FromStr for ActivityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            _ => Err(DomainError::InvalidActivityType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles a managed user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular user without administrative privilege.
    #[default]
    User,
    /// An administrator.
    Admin,
}

impl Role {
    /// Returns the wire form of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Returns whether this role carries administrator privilege.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a user managed by the identity provider.
///
/// Opaque to this system; the only rule is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or only whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value: String = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidUserId(value));
        }
        Ok(Self(value))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
