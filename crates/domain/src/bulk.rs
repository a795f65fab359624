// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk administrative operations over a set of users.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::DomainError;
use crate::types::{ActivityType, Role, UserId};

/// The four bulk operations an administrator may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulkIntent {
    /// Ban every target.
    #[serde(rename = "bulk-ban")]
    Ban,
    /// Lift the ban on every target.
    #[serde(rename = "bulk-unban")]
    Unban,
    /// Assign a new role to every target.
    #[serde(rename = "bulk-role")]
    Role,
    /// Delete every target.
    #[serde(rename = "bulk-delete")]
    Delete,
}

impl BulkIntent {
    /// Returns the form value identifying this intent.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ban => "bulk-ban",
            Self::Unban => "bulk-unban",
            Self::Role => "bulk-role",
            Self::Delete => "bulk-delete",
        }
    }

    /// Message reported when a batch fails without a usable provider message.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Ban => "Failed to bulk ban users",
            Self::Unban => "Failed to bulk unban users",
            Self::Role => "Failed to update user roles",
            Self::Delete => "Failed to delete selected users",
        }
    }
}

impl FromStr for BulkIntent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bulk-ban" => Ok(Self::Ban),
            "bulk-unban" => Ok(Self::Unban),
            "bulk-role" => Ok(Self::Role),
            "bulk-delete" => Ok(Self::Delete),
            _ => Err(DomainError::InvalidBulkIntent(s.to_string())),
        }
    }
}

impl std::fmt::Display for BulkIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bulk intent together with its action-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    /// Ban with an optional reason shared by every target.
    Ban {
        /// The ban reason, if one was given.
        reason: Option<String>,
    },
    /// Lift bans.
    Unban,
    /// Change every target's role.
    ChangeRole {
        /// The role to assign.
        role: Role,
    },
    /// Delete accounts.
    Delete,
}

impl BulkAction {
    /// Returns the intent this action carries out.
    #[must_use]
    pub const fn intent(&self) -> BulkIntent {
        match self {
            Self::Ban { .. } => BulkIntent::Ban,
            Self::Unban => BulkIntent::Unban,
            Self::ChangeRole { .. } => BulkIntent::Role,
            Self::Delete => BulkIntent::Delete,
        }
    }

    /// Returns the activity type recorded for a successful batch.
    #[must_use]
    pub const fn activity_type(&self) -> ActivityType {
        match self {
            Self::Ban { .. } => ActivityType::Ban,
            Self::Unban => ActivityType::Unban,
            Self::ChangeRole { .. } => ActivityType::Edit,
            Self::Delete => ActivityType::Delete,
        }
    }

    /// Returns the activity verb phrase recorded for a successful batch.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Ban { .. } => String::from("Banned multiple users"),
            Self::Unban => String::from("Unbanned multiple users"),
            Self::ChangeRole { role } => format!("Updated role to {role}"),
            Self::Delete => String::from("Deleted multiple users"),
        }
    }
}

/// A request to apply one action to a set of users.
///
/// Target ids form an ordered set: duplicates are dropped and the first
/// occurrence keeps its position. The request is consumed by a single
/// orchestration and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionRequest {
    action: BulkAction,
    target_ids: Vec<UserId>,
}

impl BulkActionRequest {
    /// Creates a request, removing duplicate target ids.
    #[must_use]
    pub fn new(action: BulkAction, target_ids: impl IntoIterator<Item = UserId>) -> Self {
        let mut seen: HashSet<UserId> = HashSet::new();
        let target_ids: Vec<UserId> = target_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self { action, target_ids }
    }

    /// Builds a request from an intent and its loosely-typed parameters.
    ///
    /// A blank ban reason is treated as absent. The role parameter is only
    /// consulted for [`BulkIntent::Role`], where it is required.
    ///
    /// # Errors
    ///
    /// Returns an error if a role change is requested without a role or with
    /// a role other than `admin` or `user`.
    pub fn from_parts(
        intent: BulkIntent,
        target_ids: impl IntoIterator<Item = UserId>,
        ban_reason: Option<&str>,
        role: Option<&str>,
    ) -> Result<Self, DomainError> {
        let action: BulkAction = match intent {
            BulkIntent::Ban => BulkAction::Ban {
                reason: ban_reason
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .map(str::to_string),
            },
            BulkIntent::Unban => BulkAction::Unban,
            BulkIntent::Role => {
                let role: &str = role.ok_or(DomainError::MissingBulkParameter {
                    intent: BulkIntent::Role.as_str(),
                    parameter: "role",
                })?;
                BulkAction::ChangeRole {
                    role: Role::from_str(role)?,
                }
            }
            BulkIntent::Delete => BulkAction::Delete,
        };
        Ok(Self::new(action, target_ids))
    }

    /// Returns the action to apply.
    #[must_use]
    pub const fn action(&self) -> &BulkAction {
        &self.action
    }

    /// Returns the intent of this request.
    #[must_use]
    pub const fn intent(&self) -> BulkIntent {
        self.action.intent()
    }

    /// Returns the distinct target ids in request order.
    #[must_use]
    pub fn target_ids(&self) -> &[UserId] {
        &self.target_ids
    }

    /// Returns whether the request has no targets.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.target_ids.is_empty()
    }

    /// Returns the number of distinct targets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.target_ids.len()
    }
}
