// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::{Role, UserId};

/// A user account as seen through the identity provider.
///
/// This system never owns user records; it only reads them to describe bulk
/// targets and to hold an optimistic client-side view of the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    /// The provider-assigned identifier.
    pub id: UserId,
    /// The user's email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's role.
    pub role: Role,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
    /// Whether the user is currently banned.
    #[serde(default)]
    pub banned: bool,
    /// The reason given for the current ban, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    /// When the account was created.
    #[serde(with = "crate::timestamp::iso8601")]
    pub created_at: OffsetDateTime,
}

impl ManagedUser {
    /// Creates an active, unverified user with the `user` role.
    #[must_use]
    pub fn new(id: UserId, email: String, name: String, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            email,
            name,
            role: Role::User,
            email_verified: false,
            banned: false,
            ban_reason: None,
            created_at,
        }
    }

    /// Marks the user banned with an optional reason.
    pub fn ban(&mut self, reason: Option<&str>) {
        self.banned = true;
        self.ban_reason = reason.map(str::to_string);
    }

    /// Lifts a ban and clears its reason.
    pub fn unban(&mut self) {
        self.banned = false;
        self.ban_reason = None;
    }
}

/// Partial update of a user's editable profile fields.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New verification flag.
    pub email_verified: Option<bool>,
}

impl UserPatch {
    /// Applies the present fields of this patch to a user.
    pub fn apply_to(&self, user: &mut ManagedUser) {
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(verified) = self.email_verified {
            user.email_verified = verified;
        }
    }
}
