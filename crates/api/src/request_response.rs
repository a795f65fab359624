// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use adminkit::BulkReport;
use adminkit_audit::ActivityEvent;
use adminkit_domain::{BulkActionRequest, BulkIntent, DomainError, UserId};
use adminkit_persistence::{BackendDescriptor, DEFAULT_PAGE_LIMIT, Page};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query string of `GET /api/activity`.
///
/// Values are kept as text so that a malformed number falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListActivitiesQuery {
    /// Maximum number of events. Defaults to 50.
    pub limit: Option<String>,
    /// Number of newest events to skip. Defaults to 0.
    pub offset: Option<String>,
}

impl ListActivitiesQuery {
    /// Resolves the requested page.
    #[must_use]
    pub fn page(&self) -> Page {
        let parse = |value: Option<&String>, default: u32| {
            value
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(default)
        };
        Page::new(
            parse(self.limit.as_ref(), DEFAULT_PAGE_LIMIT),
            parse(self.offset.as_ref(), 0),
        )
    }
}

/// Response of `GET /api/activity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListActivitiesResponse {
    /// Events, newest first.
    pub activities: Vec<ActivityEvent>,
}

/// Response of `POST /api/activity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogActivityResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
    /// The stored event, or `null` when logging is disabled.
    pub activity: Option<ActivityEvent>,
    /// Explains why nothing was stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Message returned when an activity is posted before setup completes.
pub const LOGGING_DISABLED_MESSAGE: &str = "Activity logging disabled during setup";

impl LogActivityResponse {
    /// A response carrying the stored event.
    #[must_use]
    pub const fn recorded(activity: ActivityEvent) -> Self {
        Self {
            success: true,
            activity: Some(activity),
            message: None,
        }
    }

    /// The synthetic success returned while setup is incomplete.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            success: true,
            activity: None,
            message: Some(String::from(LOGGING_DISABLED_MESSAGE)),
        }
    }
}

/// Body of `POST /api/setup`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSetupRequest {
    /// The database to use from now on.
    pub database_config: BackendDescriptor,
}

/// Response of `POST /api/setup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompleteSetupResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
}

/// Errors in a bulk-action form that prevent dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkFormError {
    /// No `intent` field.
    #[error("Missing intent")]
    MissingIntent,
    /// The `intent` is not a bulk operation.
    #[error("Unknown intent: {0}")]
    UnknownIntent(String),
    /// A role change named no role, or an unknown one.
    #[error("Invalid role selected")]
    InvalidRole,
    /// A target id was rejected.
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
}

/// The decoded `POST /dashboard/users` form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkActionForm {
    /// The `intent` field.
    pub intent: Option<String>,
    /// Every non-blank `userIds` value, in order.
    pub user_ids: Vec<String>,
    /// The `banReason` field.
    pub ban_reason: Option<String>,
    /// The `role` field.
    pub role: Option<String>,
}

impl BulkActionForm {
    /// Collects the form from its url-encoded pairs.
    ///
    /// `userIds` may repeat; blank values are dropped. For the single-valued
    /// fields the last occurrence wins.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut form: Self = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "intent" => form.intent = Some(value),
                "userIds" => {
                    if !value.trim().is_empty() {
                        form.user_ids.push(value);
                    }
                }
                "banReason" => form.ban_reason = Some(value),
                "role" => form.role = Some(value),
                _ => {}
            }
        }
        form
    }

    /// Builds the bulk request.
    ///
    /// Returns `Ok(None)` when no user is selected. The remaining parameters
    /// are not inspected in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if the intent is missing or unknown, the role is
    /// invalid for a role change, or a user id is rejected.
    pub fn into_request(self) -> Result<Option<BulkActionRequest>, BulkFormError> {
        let intent: String = self.intent.ok_or(BulkFormError::MissingIntent)?;
        let intent: BulkIntent = intent
            .parse()
            .map_err(|_| BulkFormError::UnknownIntent(intent.clone()))?;
        if self.user_ids.is_empty() {
            return Ok(None);
        }

        let targets: Vec<UserId> = self
            .user_ids
            .into_iter()
            .map(|id| UserId::new(id.clone()).map_err(|_| BulkFormError::InvalidUserId(id)))
            .collect::<Result<_, _>>()?;

        BulkActionRequest::from_parts(
            intent,
            targets,
            self.ban_reason.as_deref(),
            self.role.as_deref(),
        )
        .map(Some)
        // Only the role parameter can be rejected here.
        .map_err(|_: DomainError| BulkFormError::InvalidRole)
    }
}

/// Response of `POST /dashboard/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkActionResponse {
    /// Whether every target succeeded.
    pub success: bool,
    /// The reported error for a failed batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkActionResponse {
    /// A failure that never reached the provider.
    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl BulkActionResponse {
    /// A batch with nothing to do.
    #[must_use]
    pub const fn nothing_selected() -> Self {
        Self {
            success: true,
            error: None,
        }
    }
}

impl From<&BulkReport> for BulkActionResponse {
    fn from(report: &BulkReport) -> Self {
        Self {
            success: report.is_success(),
            error: report.error().map(str::to_string),
        }
    }
}
