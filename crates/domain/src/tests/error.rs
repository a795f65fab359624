// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidActivityType(String::from("promote"));
    assert_eq!(
        format!("{err}"),
        "Invalid activity type 'promote': expected one of create, edit, delete, ban, unban"
    );

    let err: DomainError = DomainError::InvalidRole(String::from("owner"));
    assert_eq!(
        format!("{err}"),
        "Invalid role 'owner': expected 'admin' or 'user'"
    );

    let err: DomainError = DomainError::InvalidBulkIntent(String::from("bulk-mute"));
    assert_eq!(format!("{err}"), "Unsupported bulk intent 'bulk-mute'");

    let err: DomainError = DomainError::MissingBulkParameter {
        intent: "bulk-role",
        parameter: "role",
    };
    assert_eq!(
        format!("{err}"),
        "Bulk intent 'bulk-role' requires parameter 'role'"
    );

    let err: DomainError = DomainError::InvalidUserId(String::from("  "));
    assert_eq!(format!("{err}"), "Invalid user id: '  '");

    let err: DomainError = DomainError::InvalidTimestamp(String::from("bad"));
    assert_eq!(format!("{err}"), "Invalid timestamp: bad");
}

#[test]
fn test_domain_error_is_std_error() {
    let err: Box<dyn std::error::Error> =
        Box::new(DomainError::InvalidRole(String::from("root")));
    assert!(err.to_string().contains("root"));
}
