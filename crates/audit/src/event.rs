// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_domain::{ActivityType, truncate_to_millis};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::generate_activity_id;

/// An immutable record of one administrative action.
///
/// Serialized with the wire names used by the activity endpoint: the actor
/// is `user`, the verb is `type`, and the persistence time is `createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Unique identifier generated at write time.
    pub id: String,
    /// Short verb phrase describing what happened.
    pub action: String,
    /// Display name of the administrator who acted.
    #[serde(rename = "user")]
    pub actor: String,
    /// What was acted upon, if recorded.
    pub target: Option<String>,
    /// The kind of action.
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Optional structured payload.
    pub metadata: Option<serde_json::Value>,
    /// Logical time of the event.
    #[serde(with = "adminkit_domain::iso8601")]
    pub timestamp: OffsetDateTime,
    /// When the event was persisted.
    #[serde(rename = "createdAt", with = "adminkit_domain::iso8601")]
    pub created_at: OffsetDateTime,
}

impl ActivityEvent {
    /// Serializes the metadata payload for storage as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn metadata_text(&self) -> Result<Option<String>, serde_json::Error> {
        self.metadata.as_ref().map(serde_json::to_string).transpose()
    }
}

/// A validated activity that has not been written yet.
///
/// This is the shape produced by internal callers such as the bulk
/// orchestrator, which never need boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    /// Short verb phrase describing what happened.
    pub action: String,
    /// Display name of the administrator who acted.
    pub actor: String,
    /// What was acted upon.
    pub target: Option<String>,
    /// The kind of action.
    pub activity_type: ActivityType,
    /// Optional structured payload.
    pub metadata: Option<serde_json::Value>,
    /// Explicit logical time; defaults to the persistence time.
    pub timestamp: Option<OffsetDateTime>,
}

impl NewActivity {
    /// Creates an activity with no target, metadata or explicit timestamp.
    ///
    /// # Arguments
    ///
    /// * `action` - The verb phrase
    /// * `actor` - The administrator's display name
    /// * `activity_type` - The kind of action
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        actor: impl Into<String>,
        activity_type: ActivityType,
    ) -> Self {
        Self {
            action: action.into(),
            actor: actor.into(),
            target: None,
            activity_type,
            metadata: None,
            timestamp: None,
        }
    }

    /// Sets the target. An empty target is stored as absent.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        let target: String = target.into();
        self.target = if target.is_empty() { None } else { Some(target) };
        self
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets an explicit logical timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Turns this activity into an event persisted at `created_at`.
    ///
    /// A fresh id is generated. Both instants are truncated to millisecond
    /// precision so the event equals what a later read returns.
    #[must_use]
    pub fn stamp(self, created_at: OffsetDateTime) -> ActivityEvent {
        let created_at: OffsetDateTime = truncate_to_millis(created_at);
        let timestamp: OffsetDateTime = self
            .timestamp
            .map_or(created_at, truncate_to_millis);
        ActivityEvent {
            id: generate_activity_id(created_at),
            action: self.action,
            actor: self.actor,
            target: self.target,
            activity_type: self.activity_type,
            metadata: self.metadata,
            timestamp,
            created_at,
        }
    }
}
