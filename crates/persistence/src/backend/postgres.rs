// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! PostgreSQL-specific backend utilities.
//!
//! Client-server connections come from an r2d2 pool. One pool exists per
//! distinct connection string; it is built and migrated on first use and
//! then shared by every later audit call for that configuration.
//!
//! ## Schema Parity
//!
//! `migrations_postgres/` must stay schema-equivalent to the `SQLite`
//! `migrations/` directory: same table, columns, nullability and index,
//! in backend-appropriate syntax. `PostgreSQL` folds unquoted identifiers
//! to lowercase, so the mixed-case `createdAt` column and the reserved
//! `user` column are quoted in its DDL.
//!
//! Validation against a real server runs only through
//! `cargo xtask test-postgres`.

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::time::Duration;
use tracing::info;

use crate::config::BackendDescriptor;
use crate::error::PersistenceError;

/// `PostgreSQL`-specific migrations.
pub const POSTGRES_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_postgres");

/// A pool of `PostgreSQL` connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Quotes a libpq connection-string value.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Builds a libpq key/value connection string for a client-server
/// descriptor.
///
/// Returns `None` for an embedded descriptor.
#[must_use]
pub fn connection_string(descriptor: &BackendDescriptor) -> Option<String> {
    let BackendDescriptor::ClientServer {
        host,
        port,
        database,
        username,
        password,
        schema,
        ssl,
    } = descriptor
    else {
        return None;
    };

    let mut conninfo: String = format!(
        "host={} port={port} dbname={} user={} password={} sslmode={}",
        quote(host),
        quote(database),
        quote(username),
        quote(password),
        if *ssl { "require" } else { "disable" },
    );
    if let Some(schema) = schema.as_deref().filter(|s| !s.trim().is_empty()) {
        conninfo.push_str(" options=");
        conninfo.push_str(&quote(&format!("-c search_path={schema}")));
    }
    Some(conninfo)
}

/// Run pending migrations on the provided `PostgreSQL` connection.
///
/// # Arguments
///
/// * `conn` - A mutable reference to a Diesel `PgConnection`
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut PgConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Running PostgreSQL database migrations");
    conn.run_pending_migrations(POSTGRES_MIGRATIONS)?;
    Ok(())
}

/// Builds a pool and applies migrations through one of its connections.
///
/// # Arguments
///
/// * `conninfo` - The connection string
/// * `max_size` - Maximum number of pooled connections
/// * `connect_timeout` - How long to wait for a connection
///
/// # Errors
///
/// Returns an error if the server cannot be reached or migration fails.
pub fn build_pool(
    conninfo: &str,
    max_size: u32,
    connect_timeout: Duration,
) -> Result<PgPool, PersistenceError> {
    let pool: PgPool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(connect_timeout)
        .build(ConnectionManager::<PgConnection>::new(conninfo))
        .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;

    let mut conn = pool
        .get()
        .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;
    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    info!(max_size, "PostgreSQL pool ready");
    Ok(pool)
}
