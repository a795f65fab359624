// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BackendKind, Dialect, Statement};

const INSERT: Statement = Statement::new(
    "INSERT INTO activity (id, {user}, {createdAt}) VALUES (?, ?, ?)",
);

#[test]
fn test_dialect_follows_backend_kind() {
    assert_eq!(Dialect::for_kind(BackendKind::Embedded), Dialect::Sqlite);
    assert_eq!(
        Dialect::for_kind(BackendKind::ClientServer),
        Dialect::Postgres
    );
}

#[test]
fn test_sqlite_rendering_keeps_question_marks_and_bare_identifiers() {
    assert_eq!(
        INSERT.render(Dialect::Sqlite),
        "INSERT INTO activity (id, user, createdAt) VALUES (?, ?, ?)"
    );
}

#[test]
fn test_postgres_rendering_numbers_placeholders_and_quotes_identifiers() {
    assert_eq!(
        INSERT.render(Dialect::Postgres),
        "INSERT INTO activity (id, \"user\", \"createdAt\") VALUES ($1, $2, $3)"
    );
}

#[test]
fn test_renderings_differ_but_share_parameter_count() {
    assert_ne!(INSERT.render(Dialect::Sqlite), INSERT.render(Dialect::Postgres));
    assert_eq!(INSERT.placeholder_count(), 3);
}

#[test]
fn test_question_marks_inside_literals_are_not_placeholders() {
    let statement = Statement::new("SELECT id FROM activity WHERE action = 'why?' AND id = ?");
    assert_eq!(statement.placeholder_count(), 1);
    assert_eq!(
        statement.render(Dialect::Postgres),
        "SELECT id FROM activity WHERE action = 'why?' AND id = $1"
    );
}

#[test]
fn test_escaped_quotes_inside_literals_are_preserved() {
    let statement = Statement::new("SELECT 'it''s ?' , ?");
    assert_eq!(statement.render(Dialect::Postgres), "SELECT 'it''s ?' , $1");
}

#[test]
fn test_braces_that_are_not_identifiers_pass_through() {
    let statement = Statement::new("SELECT '{}' , { not an ident } , ?");
    assert_eq!(
        statement.render(Dialect::Sqlite),
        "SELECT '{}' , { not an ident } , ?"
    );
}

#[test]
fn test_sqlite_quotes_only_its_reserved_words() {
    assert_eq!(Dialect::Sqlite.identifier("user"), "user");
    assert_eq!(Dialect::Sqlite.identifier("createdAt"), "createdAt");
    assert_eq!(Dialect::Sqlite.identifier("order"), "\"order\"");
}

#[test]
fn test_postgres_quotes_reserved_and_mixed_case() {
    assert_eq!(Dialect::Postgres.identifier("target"), "target");
    assert_eq!(Dialect::Postgres.identifier("user"), "\"user\"");
    assert_eq!(Dialect::Postgres.identifier("createdAt"), "\"createdAt\"");
}

#[test]
fn test_dialect_display() {
    assert_eq!(Dialect::Sqlite.to_string(), "sqlite");
    assert_eq!(Dialect::Postgres.to_string(), "postgres");
}
