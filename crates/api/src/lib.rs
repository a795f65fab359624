// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for adminkit.
//!
//! This crate sits between the HTTP server and the domain: it defines the
//! request and response shapes, the admin authorization rule, and handler
//! functions for completing setup, for reading and writing the activity
//! log, and for bulk user actions. Storage stays behind the persistence
//! crate.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{ApiError, AuthError, translate_persistence_error};
pub use handlers::{
    FETCH_FAILED_MESSAGE, LOG_FAILED_MESSAGE, SETUP_ALREADY_COMPLETE_MESSAGE, bulk_action,
    complete_setup, list_activities, log_activity,
};
pub use request_response::{
    BulkActionForm, BulkActionResponse, BulkFormError, CompleteSetupRequest,
    CompleteSetupResponse, LOGGING_DISABLED_MESSAGE, ListActivitiesQuery, ListActivitiesResponse,
    LogActivityResponse,
};
