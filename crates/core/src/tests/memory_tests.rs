// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_domain::{ManagedUser, Role};

use crate::tests::helpers::{create_test_directory, user_id};
use crate::{IdentityProvider, MemoryDirectory, ProviderError};

#[tokio::test]
async fn test_unknown_user_is_an_error() {
    let directory: MemoryDirectory = create_test_directory();

    let err: ProviderError = directory.delete_user(&user_id("ghost")).await.unwrap_err();
    assert_eq!(err.message, "User ghost not found");
    assert_eq!(directory.mutation_calls(), 1);
}

#[tokio::test]
async fn test_describe_skips_unknown_ids_and_keeps_order() {
    let directory: MemoryDirectory = create_test_directory();

    let users: Vec<ManagedUser> = directory
        .describe_users(&[user_id("u3"), user_id("ghost"), user_id("u1")])
        .await
        .unwrap();

    let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["c@x", "a@x"]);
}

#[tokio::test]
async fn test_injected_failure_leaves_user_untouched() {
    let directory: MemoryDirectory = create_test_directory();
    directory.fail_for(user_id("u1"), "locked");

    let result: Result<(), ProviderError> = directory.set_role(&user_id("u1"), Role::Admin).await;

    assert_eq!(result, Err(ProviderError::new("locked")));
    assert_eq!(directory.user(&user_id("u1")).unwrap().role, Role::User);
}
