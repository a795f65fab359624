// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Sessions are issued by the identity provider. The server only resolves
//! the bearer token to an actor; whether an actor is required at all is
//! decided by the handler, since several endpoints stay open until setup
//! has completed.

use adminkit_api::AuthenticatedActor;
use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use std::convert::Infallible;
use tracing::{debug, warn};

use crate::AppState;

/// The actor behind the request's `Authorization: Bearer <token>` header.
///
/// Holds `None` when the header is missing, malformed, or names an unknown
/// session. Handlers pass it straight to the API layer, which answers 401
/// where an admin is required.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionActor(actor): SessionActor,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: Option<AuthenticatedActor>
/// }
/// ```
pub struct SessionActor(pub Option<AuthenticatedActor>);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(None));
        };

        let Ok(value) = header.to_str() else {
            warn!("Invalid Authorization header encoding");
            return Ok(Self(None));
        };

        let actor: Option<AuthenticatedActor> = state.sessions.authenticate(Some(value));
        match &actor {
            Some(actor) => debug!(actor = %actor.id, role = %actor.role, "Session resolved"),
            None => warn!("Unknown or malformed session token"),
        }
        Ok(Self(actor))
    }
}
