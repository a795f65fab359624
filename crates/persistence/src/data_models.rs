// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_audit::ActivityEvent;
use adminkit_domain::{ActivityType, parse_timestamp};
use diesel::QueryableByName;
use diesel::sql_types::{Nullable, Text};
use serde_json::Value;

use crate::error::PersistenceError;

/// A stored activity row, as read back from either backend.
///
/// Column names are aliased in the select list so the same struct decodes
/// rows from both dialects.
#[derive(Debug, Clone, QueryableByName)]
pub struct ActivityRow {
    #[diesel(sql_type = Text)]
    pub id: String,
    #[diesel(sql_type = Text)]
    pub action: String,
    #[diesel(sql_type = Text)]
    pub actor: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub target: Option<String>,
    #[diesel(sql_type = Text)]
    pub activity_type: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub metadata: Option<String>,
    #[diesel(sql_type = Text)]
    pub timestamp: String,
    #[diesel(sql_type = Text)]
    pub created_at: String,
}

impl ActivityRow {
    /// Decodes the row into an event.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::CorruptRow`] naming the first column that
    /// could not be decoded.
    pub fn into_event(self) -> Result<ActivityEvent, PersistenceError> {
        let corrupt = |message: String| PersistenceError::CorruptRow {
            id: self.id.clone(),
            message,
        };

        let activity_type: ActivityType = self
            .activity_type
            .parse()
            .map_err(|e: adminkit_domain::DomainError| corrupt(e.to_string()))?;
        let timestamp = parse_timestamp(&self.timestamp).map_err(|e| corrupt(e.to_string()))?;
        let created_at = parse_timestamp(&self.created_at).map_err(|e| corrupt(e.to_string()))?;
        let metadata: Option<Value> = self
            .metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| corrupt(format!("metadata is not JSON: {e}")))?;

        Ok(ActivityEvent {
            id: self.id,
            action: self.action,
            actor: self.actor,
            target: self.target,
            activity_type,
            metadata,
            timestamp,
            created_at,
        })
    }
}
