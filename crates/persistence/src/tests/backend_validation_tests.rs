// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for `PostgreSQL` support.
//!
//! These tests validate that the activity log behaves identically on the
//! client-server backend.
//!
//! ## Purpose
//!
//! The purpose of these tests is to ensure:
//! 1. Migrations apply cleanly on `PostgreSQL`
//! 2. The quoted `"user"` and `"createdAt"` columns are addressed correctly
//! 3. `$n` placeholders bind in order
//! 4. Ordering and paging match the `SQLite` behavior
//!
//! ## Test Execution
//!
//! - `SQLite` tests run normally via `cargo test`
//! - `PostgreSQL` tests are marked `#[ignore]` and run only via `cargo xtask test-postgres`
//!
//! ## Infrastructure Requirements
//!
//! `PostgreSQL` tests require:
//! - `DATABASE_URL` environment variable (set by xtask)
//! - `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`, `PGDATABASE` (set by xtask)
//! - `ADMINKIT_TEST_BACKEND=postgres` environment variable
//! - Running `PostgreSQL` instance (provisioned by xtask)
//!
//! Tests fail fast if required infrastructure is missing.

use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::{PgConnection, QueryableByName};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use time::macros::datetime;

use super::{FixedCheck, SwitchableSource, create_test_draft};
use crate::backend::postgres;
use crate::{ActivityLog, BackendDescriptor, DatabaseConnector, Page, SetupGate};
use adminkit_audit::NewActivity;
use adminkit_domain::ActivityType;

/// Result type for COUNT queries.
#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Helper to get the `PostgreSQL` connection URL from environment.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_postgres_url() -> String {
    env::var("DATABASE_URL").expect(
        "DATABASE_URL not set - PostgreSQL tests must be run via `cargo xtask test-postgres`",
    )
}

fn required_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        panic!("{name} not set - PostgreSQL tests must be run via `cargo xtask test-postgres`")
    })
}

/// Helper to verify we're running in the `PostgreSQL` test environment.
///
/// # Panics
///
/// Panics if `ADMINKIT_TEST_BACKEND` is not set to `postgres`.
fn verify_postgres_test_environment() {
    let backend = env::var("ADMINKIT_TEST_BACKEND").expect(
        "ADMINKIT_TEST_BACKEND not set - PostgreSQL tests must be run via `cargo xtask test-postgres`",
    );
    assert_eq!(backend, "postgres", "ADMINKIT_TEST_BACKEND must be 'postgres'");
}

/// Builds a descriptor for the provisioned server, using a fresh schema so
/// tests do not see each other's rows.
fn postgres_descriptor(schema: &str) -> BackendDescriptor {
    let url = get_postgres_url();
    let mut conn = PgConnection::establish(&url).expect("Failed to connect to PostgreSQL");
    diesel::sql_query(format!("DROP SCHEMA IF EXISTS {schema} CASCADE"))
        .execute(&mut conn)
        .expect("Failed to drop test schema");
    diesel::sql_query(format!("CREATE SCHEMA {schema}"))
        .execute(&mut conn)
        .expect("Failed to create test schema");

    BackendDescriptor::ClientServer {
        host: required_var("PGHOST"),
        port: required_var("PGPORT").parse().expect("PGPORT is a port"),
        database: required_var("PGDATABASE"),
        username: required_var("PGUSER"),
        password: required_var("PGPASSWORD"),
        schema: Some(schema.to_string()),
        ssl: false,
    }
}

fn create_postgres_log(schema: &str) -> ActivityLog<DatabaseConnector> {
    let source = Arc::new(SwitchableSource::new(Some(postgres_descriptor(schema))));
    let gate = Arc::new(SetupGate::new(Arc::new(FixedCheck::new(true))));
    ActivityLog::new(source, gate, DatabaseConnector::new().with_pool_size(2))
}

#[test]
#[ignore = "requires PostgreSQL via cargo xtask test-postgres"]
fn test_postgres_connection() {
    verify_postgres_test_environment();
    let url = get_postgres_url();

    let result = PgConnection::establish(&url);
    assert!(
        result.is_ok(),
        "Failed to connect to PostgreSQL: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires PostgreSQL via cargo xtask test-postgres"]
fn test_postgres_migrations_apply_cleanly() {
    verify_postgres_test_environment();
    let url = get_postgres_url();

    let pool = postgres::build_pool(&url, 1, Duration::from_secs(5))
        .expect("Failed to build PostgreSQL pool and run migrations");
    let mut conn = pool.get().expect("pooled connection");

    let count: i64 = diesel::sql_query("SELECT COUNT(*) AS count FROM activity")
        .get_result::<CountResult>(&mut *conn)
        .map(|r| r.count)
        .expect("activity table should exist");
    assert!(count >= 0);
}

#[test]
#[ignore = "requires PostgreSQL via cargo xtask test-postgres"]
fn test_postgres_append_then_list() {
    verify_postgres_test_environment();
    let log = create_postgres_log("adminkit_append");

    let outcome = log
        .append(create_test_draft("Created user", "create"))
        .expect("append should succeed");
    let event = outcome.activity().cloned().expect("event recorded");

    let listed = log.list(Page::new(1, 0)).expect("list should succeed");
    assert_eq!(listed, vec![event]);
}

#[test]
#[ignore = "requires PostgreSQL via cargo xtask test-postgres"]
fn test_postgres_ordering_and_paging() {
    verify_postgres_test_environment();
    let log = create_postgres_log("adminkit_paging");
    let times = [
        datetime!(2026-01-01 09:00:00 UTC),
        datetime!(2026-01-03 09:00:00 UTC),
        datetime!(2026-01-02 09:00:00 UTC),
    ];
    for (i, at) in times.into_iter().enumerate() {
        log.record(
            NewActivity::new(format!("Action {i}"), "Alice Admin", ActivityType::Edit).at(at),
        )
        .expect("record should succeed");
    }

    let page = log.list(Page::new(2, 0)).expect("list should succeed");
    let actions: Vec<&str> = page.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["Action 1", "Action 2"]);
}

#[test]
#[ignore = "requires PostgreSQL via cargo xtask test-postgres"]
fn test_postgres_pool_is_shared_across_calls() {
    verify_postgres_test_environment();
    let log = create_postgres_log("adminkit_pool");

    log.list(Page::default()).expect("first call");
    log.list(Page::default()).expect("second call");

    assert_eq!(log.connector().cached_pools(), 1);
    log.reconfigured();
    assert_eq!(log.connector().cached_pools(), 0);
}
