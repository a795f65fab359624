// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is owned by an external provider. This module only resolves a
//! bearer token to an [`AuthenticatedActor`] and decides whether that actor
//! may perform an administrative action.

use adminkit_domain::Role;
use std::collections::HashMap;

use crate::error::AuthError;

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The display name recorded in the activity log.
    pub name: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `name` - The actor's display name
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor is present and holds the admin role.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor, if any
    /// * `action` - The action being attempted, for the error
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] if there is no actor and
    /// [`AuthError::Unauthorized`] if the actor is not an admin.
    pub fn authorize_admin<'a>(
        actor: Option<&'a AuthenticatedActor>,
        action: &str,
    ) -> Result<&'a AuthenticatedActor, AuthError> {
        let actor: &AuthenticatedActor = actor.ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("no session"),
        })?;
        if actor.role.is_admin() {
            Ok(actor)
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("admin"),
            })
        }
    }
}

/// Resolves bearer tokens issued by the identity provider.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationService {
    sessions: HashMap<String, AuthenticatedActor>,
}

impl AuthenticationService {
    /// Creates a service with no sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session token for an actor.
    pub fn insert_session(&mut self, token: impl Into<String>, actor: AuthenticatedActor) {
        self.sessions.insert(token.into(), actor);
    }

    /// Resolves an `Authorization` header value.
    ///
    /// Returns `None` when the header is absent, is not a bearer token, or
    /// names an unknown session.
    #[must_use]
    pub fn authenticate(&self, authorization: Option<&str>) -> Option<AuthenticatedActor> {
        let token: &str = authorization?
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())?;
        self.sessions.get(token).cloned()
    }
}
