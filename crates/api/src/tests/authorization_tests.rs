// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_admin, create_test_member};
use crate::{ApiError, AuthError, AuthenticationService, AuthorizationService};

#[test]
fn test_admin_is_authorized() {
    let admin = create_test_admin();
    let result = AuthorizationService::authorize_admin(Some(&admin), "list_activities");
    assert_eq!(result, Ok(&admin));
}

#[test]
fn test_missing_actor_is_unauthenticated() {
    let result = AuthorizationService::authorize_admin(None, "list_activities");
    assert!(matches!(result, Err(AuthError::AuthenticationFailed { .. })));
}

#[test]
fn test_non_admin_is_forbidden() {
    let member = create_test_member();
    let result = AuthorizationService::authorize_admin(Some(&member), "bulk_action");
    assert_eq!(
        result,
        Err(AuthError::Unauthorized {
            action: String::from("bulk_action"),
            required_role: String::from("admin"),
        })
    );
}

#[test]
fn test_auth_errors_map_to_client_messages() {
    let unauthenticated: ApiError = AuthError::AuthenticationFailed {
        reason: String::from("no session"),
    }
    .into();
    let forbidden: ApiError = AuthError::Unauthorized {
        action: String::from("log_activity"),
        required_role: String::from("admin"),
    }
    .into();

    assert_eq!(unauthenticated.client_message(), "Unauthorized");
    assert_eq!(forbidden.client_message(), "Forbidden");
}

#[test]
fn test_bearer_token_resolves_session() {
    let mut service = AuthenticationService::new();
    service.insert_session("secret-token", create_test_admin());

    assert_eq!(
        service.authenticate(Some("Bearer secret-token")),
        Some(create_test_admin())
    );
    assert_eq!(service.authenticate(Some("Bearer other")), None);
    assert_eq!(service.authenticate(Some("secret-token")), None);
    assert_eq!(service.authenticate(Some("Bearer ")), None);
    assert_eq!(service.authenticate(None), None);
}
