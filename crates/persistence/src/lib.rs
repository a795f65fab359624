// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for adminkit.
//!
//! This crate owns everything that touches disk or a database: the
//! persisted application configuration, the setup gate, and the admin
//! activity log together with the connection adapter it writes through.
//!
//! ## Database Backend Support
//!
//! ### Supported Backends
//!
//! - **`SQLite`** (default): Used for development, unit tests, and integration tests
//! - **`PostgreSQL`**: Validated via explicit opt-in tests
//!
//! The backend is chosen per call from the descriptor in the configuration
//! file, so a saved reconfiguration takes effect on the next call.
//!
//! ### Additional Backend: `PostgreSQL`
//!
//! `PostgreSQL` support is compiled by default (no feature flags) but validated
//! only via explicit opt-in tests. See the `backend::postgres` module for details.
//!
//! To run `PostgreSQL` validation tests:
//! ```bash
//! cargo xtask test-postgres
//! ```
//!
//! This command:
//! 1. Starts a `PostgreSQL` container via `Docker`
//! 2. Runs migrations
//! 3. Executes backend validation tests marked with `#[ignore]`
//! 4. Cleans up the container
//!
//! ### Migration Strategy
//!
//! Identifier quoting differs between backends, so there are separate
//! migration directories:
//!
//! - `migrations/`: `SQLite`-specific (default)
//! - `migrations_postgres/`: `PostgreSQL`-specific
//!
//! Both produce identical schema semantics but use backend-appropriate syntax.
//! Statements themselves are written once as [`Statement`] templates and
//! rendered per [`Dialect`].
//!
//! ## Testing Philosophy
//!
//! - Standard tests (`cargo test`) run against `SQLite` only
//! - Backend validation tests are explicitly marked `#[ignore]`
//! - External database tests never run automatically
//! - All infrastructure is orchestrated by `xtask`, not embedded in tests
//! - Tests fail fast if required infrastructure is missing

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

/// Macro to generate monomorphic backend-specific functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_pg` taking `&mut PgConnection`
///
/// Inside the body, `Db` names the backend type of the connection.
///
/// This approach is required because Diesel's type system requires concrete
/// backend types at compile time and cannot handle generic backend functions.
///
/// # Constraints
///
/// - The macro ONLY duplicates function bodies and substitutes connection types
/// - No logic, branching, or dispatch occurs within the macro
/// - Backend dispatch happens exclusively in `DatabaseConnection`
/// - The generated functions are completely monomorphic in the backend
///
/// # Usage
///
/// ```ignore
/// backend_fn! {
///     fn run[T: QueryableByName<Sqlite> + QueryableByName<Pg> + 'static](
///         conn: &mut _,
///         sql: String,
///     ) -> Result<Vec<T>, PersistenceError> {
///         Ok(diesel::sql_query(sql).load::<T>(conn)?)
///     }
/// }
/// ```
///
/// This generates:
/// - `run_sqlite<T>(&mut SqliteConnection, String) -> Result<Vec<T>, PersistenceError>`
/// - `run_pg<T>(&mut PgConnection, String) -> Result<Vec<T>, PersistenceError>`
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident $([$($generics:tt)*])? (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            // Generate SQLite version
            $(#[$meta])*
            $vis fn [<$name _sqlite>] $(<$($generics)*>)? (
                $conn: &mut diesel::SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            {
                #[allow(dead_code)]
                type Db = diesel::sqlite::Sqlite;
                $body
            }

            // Generate PostgreSQL version
            $(#[$meta])*
            $vis fn [<$name _pg>] $(<$($generics)*>)? (
                $conn: &mut diesel::PgConnection
                $(, $param : $param_ty)*
            ) -> $ret
            {
                #[allow(dead_code)]
                type Db = diesel::pg::Pg;
                $body
            }
        }
    };
}

mod activity;
mod backend;
mod config;
mod connection;
mod data_models;
mod dialect;
mod error;
mod gate;

#[cfg(test)]
mod tests;

pub use activity::{ActivityLog, AppendOutcome, DEFAULT_PAGE_LIMIT, Page};
pub use backend::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_SIZE, DatabaseConnection, DatabaseConnector,
};
pub use config::{
    AppConfig, BackendDescriptor, BackendKind, ConfigError, ConfigStore, DescriptorSource,
};
pub use connection::{Connector, SqlConnection, SqlValue, check_arity};
pub use data_models::ActivityRow;
pub use dialect::{Dialect, Statement};
pub use error::PersistenceError;
pub use gate::{SetupCheck, SetupGate};

/// The production activity log: configuration from a JSON file, backends
/// opened by [`DatabaseConnector`].
pub type Persistence = ActivityLog<DatabaseConnector>;
