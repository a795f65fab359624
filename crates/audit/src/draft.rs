// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_domain::ActivityType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

use crate::event::NewActivity;

/// Errors raised when an activity draft is incomplete or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields are absent or empty.
    MissingFields(Vec<&'static str>),
    /// The `type` field is not a known activity type.
    UnknownActivityType(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            Self::UnknownActivityType(value) => {
                write!(
                    f,
                    "Invalid activity type '{value}': expected one of create, edit, delete, ban, unban"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// An activity as submitted by a client, before validation.
///
/// Every field is optional so that missing input is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    /// Short verb phrase. Required.
    pub action: Option<String>,
    /// Administrator display name. Required.
    pub user: Option<String>,
    /// What was acted upon.
    pub target: Option<String>,
    /// Activity type name. Required.
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    /// Optional structured payload.
    pub metadata: Option<serde_json::Value>,
    /// Explicit logical timestamp. Never accepted from the wire.
    #[serde(skip)]
    pub timestamp: Option<OffsetDateTime>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl ActivityDraft {
    /// Validates this draft.
    ///
    /// Empty strings count as missing. All missing required fields are
    /// reported together, in the order `action`, `user`, `type`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or the activity type
    /// is unknown.
    pub fn validate(self) -> Result<NewActivity, ValidationError> {
        let mut missing: Vec<&'static str> = Vec::new();
        if present(self.action.as_deref()).is_none() {
            missing.push("action");
        }
        if present(self.user.as_deref()).is_none() {
            missing.push("user");
        }
        if present(self.activity_type.as_deref()).is_none() {
            missing.push("type");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let type_name: String = self.activity_type.unwrap_or_default();
        let activity_type: ActivityType = ActivityType::from_str(&type_name)
            .map_err(|_| ValidationError::UnknownActivityType(type_name.clone()))?;

        let mut activity: NewActivity = NewActivity::new(
            self.action.unwrap_or_default(),
            self.user.unwrap_or_default(),
            activity_type,
        );
        if let Some(target) = self.target {
            activity = activity.with_target(target);
        }
        activity.metadata = self.metadata.filter(|m| !m.is_null());
        activity.timestamp = self.timestamp;
        Ok(activity)
    }
}
