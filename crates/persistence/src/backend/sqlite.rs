// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite-specific backend utilities.
//!
//! Embedded connections are short-lived: each audit call establishes one,
//! uses it for a single statement and closes it. Setup therefore runs on
//! every open and must stay cheap and idempotent.

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::path::Path;
use tracing::{debug, info};

use crate::error::PersistenceError;

/// SQLite-specific migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Run pending migrations on the provided connection.
///
/// # Arguments
///
/// * `conn` - A mutable reference to a Diesel `SqliteConnection`
///
/// # Errors
///
/// Returns an error if migration execution fails.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        info!(count = applied.len(), "Applied SQLite migrations");
    }
    Ok(())
}

/// Enable WAL mode so readers are not blocked by a concurrent writer.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn enable_wal_mode(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    // NOTE: PRAGMA is raw SQL (Diesel has no PRAGMA DSL)
    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}

/// Make concurrent short-lived connections wait for each other instead of
/// failing with `SQLITE_BUSY`.
///
/// # Errors
///
/// Returns an error if the PRAGMA statement fails.
pub fn set_busy_timeout(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
    Ok(())
}

/// Initialize a `SQLite` database at the given URL and run migrations.
///
/// # Arguments
///
/// * `database_url` - The `SQLite` database URL (e.g., `":memory:"` or file path)
///
/// # Errors
///
/// Returns an error if connection, configuration or migration fails.
pub fn initialize_database(database_url: &str) -> Result<SqliteConnection, PersistenceError> {
    debug!(database_url, "Opening SQLite database");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;

    set_busy_timeout(&mut conn)?;
    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Opens the database file at `path` for one audit call.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or prepared.
pub fn open(path: &Path) -> Result<SqliteConnection, PersistenceError> {
    let mut conn: SqliteConnection = initialize_database(&path.to_string_lossy())?;
    enable_wal_mode(&mut conn)?;
    Ok(conn)
}
