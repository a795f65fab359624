// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for the activity log and bulk user actions.
//!
//! Handlers are transport-agnostic: they take the already-resolved actor
//! and decoded input, and return DTOs or an [`ApiError`]. The server maps
//! these onto HTTP.

use adminkit::{ActivityRecorder, BulkOrchestrator, BulkReport, IdentityProvider};
use adminkit_audit::ActivityDraft;
use adminkit_domain::BulkActionRequest;
use adminkit_persistence::{ActivityLog, AppConfig, AppendOutcome, ConfigStore, Connector};
use tracing::{error, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{
    BulkActionForm, BulkActionResponse, CompleteSetupRequest, CompleteSetupResponse,
    ListActivitiesQuery, ListActivitiesResponse, LogActivityResponse,
};

/// Client-facing message when reading the activity log fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch activities";

/// Client-facing message when writing the activity log fails.
pub const LOG_FAILED_MESSAGE: &str = "Failed to log activity";

/// Client-facing message when setup is attempted a second time.
pub const SETUP_ALREADY_COMPLETE_MESSAGE: &str = "Setup already complete";

/// Finishes the one-time setup flow.
///
/// Saves the chosen database with `setupComplete: true` and tells the log it
/// was reconfigured, so the next request sees the new configuration. Only
/// available while setup is incomplete, and therefore unauthenticated: there
/// is no admin to authenticate yet.
///
/// # Errors
///
/// Returns an error if:
/// - Setup has already completed
/// - The descriptor is invalid or its location does not exist
/// - The configuration cannot be saved
pub fn complete_setup<C: Connector>(
    store: &ConfigStore,
    log: &ActivityLog<C>,
    request: CompleteSetupRequest,
) -> Result<CompleteSetupResponse, ApiError> {
    if log.is_setup_complete() {
        return Err(ApiError::InvalidInput {
            field: String::from("setup"),
            message: String::from(SETUP_ALREADY_COMPLETE_MESSAGE),
        });
    }

    let descriptor = request.database_config;
    descriptor
        .validate()
        .map_err(|e| ApiError::InvalidInput {
            field: String::from("databaseConfig"),
            message: e.to_string(),
        })?;
    if !descriptor.is_locally_reachable() {
        return Err(ApiError::InvalidInput {
            field: String::from("databaseConfig"),
            message: String::from("Database location does not exist"),
        });
    }

    let kind = descriptor.kind();
    store
        .save(&AppConfig {
            setup_complete: true,
            database_config: Some(descriptor),
        })
        .map_err(|e| {
            error!(error = %e, "Failed to save configuration");
            ApiError::Internal {
                message: String::from("Failed to save configuration"),
            }
        })?;
    log.reconfigured();

    info!(backend = ?kind, "Setup completed");
    Ok(CompleteSetupResponse { success: true })
}

/// Lists recent admin activity.
///
/// Before setup has completed this returns an empty list without requiring
/// authentication. Afterwards an admin is required.
///
/// # Arguments
///
/// * `log` - The activity log
/// * `actor` - The authenticated actor, if any
/// * `query` - Paging parameters
///
/// # Errors
///
/// Returns an error if:
/// - No actor is authenticated, or the actor is not an admin
/// - The log cannot be read
pub fn list_activities<C: Connector>(
    log: &ActivityLog<C>,
    actor: Option<&AuthenticatedActor>,
    query: &ListActivitiesQuery,
) -> Result<ListActivitiesResponse, ApiError> {
    if !log.is_setup_complete() {
        return Ok(ListActivitiesResponse {
            activities: Vec::new(),
        });
    }

    AuthorizationService::authorize_admin(actor, "list_activities")?;

    let activities = log
        .list(query.page())
        .map_err(|e| translate_persistence_error(e, FETCH_FAILED_MESSAGE))?;
    Ok(ListActivitiesResponse { activities })
}

/// Records an admin activity.
///
/// Before setup has completed this reports success without storing
/// anything or requiring authentication.
///
/// # Arguments
///
/// * `log` - The activity log
/// * `actor` - The authenticated actor, if any
/// * `draft` - The submitted activity
///
/// # Errors
///
/// Returns an error if:
/// - No actor is authenticated, or the actor is not an admin
/// - A required field is missing or the type is unknown
/// - The log cannot be written
pub fn log_activity<C: Connector>(
    log: &ActivityLog<C>,
    actor: Option<&AuthenticatedActor>,
    draft: ActivityDraft,
) -> Result<LogActivityResponse, ApiError> {
    if !log.is_setup_complete() {
        return Ok(LogActivityResponse::disabled());
    }

    let actor: &AuthenticatedActor = AuthorizationService::authorize_admin(actor, "log_activity")?;

    match log
        .append(draft)
        .map_err(|e| translate_persistence_error(e, LOG_FAILED_MESSAGE))?
    {
        AppendOutcome::Recorded(event) => {
            info!(id = %event.id, admin = %actor.id, "Activity logged via API");
            Ok(LogActivityResponse::recorded(event))
        }
        AppendOutcome::Skipped => Ok(LogActivityResponse::disabled()),
    }
}

/// Applies a bulk action from the user management form.
///
/// # Arguments
///
/// * `orchestrator` - Executes the batch and records its activity
/// * `actor` - The authenticated actor, if any
/// * `form` - The decoded form
///
/// # Returns
///
/// A response with `success: false` and an error message when the form is
/// invalid or any target failed.
///
/// # Errors
///
/// Returns an error if no actor is authenticated or the actor is not an
/// admin.
pub async fn bulk_action<P, R>(
    orchestrator: &BulkOrchestrator<P, R>,
    actor: Option<&AuthenticatedActor>,
    form: BulkActionForm,
) -> Result<BulkActionResponse, ApiError>
where
    P: IdentityProvider,
    R: ActivityRecorder,
{
    let actor: &AuthenticatedActor = AuthorizationService::authorize_admin(actor, "bulk_action")?;

    let request: BulkActionRequest = match form.into_request() {
        Ok(Some(request)) => request,
        Ok(None) => {
            info!(admin = %actor.id, "Bulk action with no users selected");
            return Ok(BulkActionResponse::nothing_selected());
        }
        Err(e) => {
            warn!(error = %e, admin = %actor.id, "Rejected bulk action form");
            return Ok(BulkActionResponse::rejected(e.to_string()));
        }
    };

    info!(
        intent = %request.intent(),
        targets = request.len(),
        admin = %actor.id,
        "Executing bulk action"
    );
    let report: BulkReport = orchestrator.execute(&actor.name, &request).await;
    Ok(BulkActionResponse::from(&report))
}
