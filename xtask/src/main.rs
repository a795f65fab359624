// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation and Infrastructure Orchestration
//!
//! ### Backend Testing Commands
//!
//! - `cargo test`: Runs all standard tests against `SQLite` (fast, no infrastructure)
//! - `cargo xtask test-postgres`: Runs backend validation tests against `PostgreSQL`
//! - `cargo xtask verify-migrations`: Checks that both migration sets build the same schema
//! - `cargo xtask ci --postgres`: Full CI, including both of the above
//!
//! ### Implementation Details
//!
//! The `test-postgres` command:
//! - Orchestrates Docker container lifecycle (start, wait, stop, cleanup)
//! - Provisions a `PostgreSQL` 16 container with a test database
//! - Sets `DATABASE_URL`, the libpq `PG*` variables and `ADMINKIT_TEST_BACKEND`
//! - Executes explicitly ignored tests via `--ignored` flag
//! - Cleans up even when tests fail
//!
//! Standard `cargo test` never needs a database server. Tests that do are
//! ignored by default and only run from here.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{PgConnection, QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI {
        /// Also run the `PostgreSQL` validation tests and migration parity check
        #[arg(long)]
        postgres: bool,
    },

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Run `PostgreSQL` backend validation tests
    #[command(visible_alias = "tp")]
    TestPostgres,

    /// Verify schema parity between `SQLite` and `PostgreSQL` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI { postgres } => ci(postgres),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::TestPostgres => test_postgres(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test)
///
/// The `SQLite` suite always runs. With `postgres` the Docker-backed
/// validation tests and the migration parity check follow it.
fn ci(postgres: bool) -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    if postgres {
        test_postgres()?;
        verify_migrations()?;
    }
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Run tests for libs and docs
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// A throwaway `PostgreSQL` container.
struct PostgresContainer {
    name: &'static str,
    database: &'static str,
    user: &'static str,
    password: &'static str,
    port: &'static str,
}

impl PostgresContainer {
    const TEST: Self = Self {
        name: "adminkit-test-postgres",
        database: "adminkit_test",
        user: "adminkit",
        password: "test_password",
        port: "5433",
    };

    const VERIFY: Self = Self {
        name: "adminkit-verify-migrations",
        database: "adminkit_verify",
        user: "adminkit",
        password: "verify_password",
        port: "5434",
    };

    fn url(&self) -> String {
        format!(
            "postgres://{}:{}@127.0.0.1:{}/{}",
            self.user, self.password, self.port, self.database
        )
    }

    /// Starts the container and waits up to 30 seconds for it to accept
    /// connections. Cleans up after itself on failure.
    fn start(&self) -> Result<()> {
        use std::thread::sleep;
        use std::time::Duration;

        tracing::info!("Checking Docker availability");
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        tracing::info!("Cleaning up any existing container");
        self.stop();

        tracing::info!("Starting PostgreSQL container: {}", self.name);
        cmd!(
            "docker",
            "run",
            "--name",
            self.name,
            "-e",
            format!("POSTGRES_DB={}", self.database),
            "-e",
            format!("POSTGRES_USER={}", self.user),
            "-e",
            format!("POSTGRES_PASSWORD={}", self.password),
            "-p",
            format!("{}:5432", self.port),
            "-d",
            "postgres:16"
        )
        .run_with_trace()
        .wrap_err("Failed to start PostgreSQL container")?;

        tracing::info!("Waiting for PostgreSQL to be ready...");
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {}/{}", attempt, max_attempts);

            let result = cmd!(
                "docker",
                "exec",
                self.name,
                "pg_isready",
                "-U",
                self.user,
                "-d",
                self.database
            )
            .run();

            if result.is_ok() {
                tracing::info!("PostgreSQL is ready");
                return Ok(());
            }
        }

        self.stop();
        Err(color_eyre::eyre::eyre!(
            "PostgreSQL did not become ready within timeout"
        ))
    }

    fn stop(&self) {
        let _ = cmd!("docker", "stop", self.name).run();
        let _ = cmd!("docker", "rm", self.name).run();
    }
}

/// Run `PostgreSQL` backend validation tests
///
/// This command provides explicit, opt-in backend validation for `PostgreSQL`.
/// It orchestrates all required infrastructure and runs the ignored tests in
/// `adminkit-persistence` that exercise the pooled client-server path.
///
/// ## What This Command Does
///
/// 1. Validates Docker is available
/// 2. Starts a `PostgreSQL` 16 container with a test database
/// 3. Waits for `PostgreSQL` to be ready (up to 30 seconds)
/// 4. Sets required environment variables:
///    - `DATABASE_URL`: `PostgreSQL` connection string
///    - `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`, `PGDATABASE`
///    - `ADMINKIT_TEST_BACKEND`: Set to "postgres"
/// 5. Runs ignored backend validation tests
/// 6. Stops and removes the container (always, even on failure)
///
/// ## Requirements
///
/// - Docker must be installed and running
/// - Port 5433 must be available
/// - libpq must be available for compilation
///
/// ## Usage
///
/// ```bash
/// cargo xtask test-postgres
/// ```
fn test_postgres() -> Result<()> {
    tracing::info!("Starting PostgreSQL backend validation");

    let container = PostgresContainer::TEST;
    container.start()?;

    // Filter to only backend_validation_tests module to avoid running non-ignored tests
    tracing::info!("Running PostgreSQL backend validation tests");
    let test_result = cmd!(
        "cargo",
        "test",
        "--package",
        "adminkit-persistence",
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.url())
    .env("PGHOST", "127.0.0.1")
    .env("PGPORT", container.port)
    .env("PGUSER", container.user)
    .env("PGPASSWORD", container.password)
    .env("PGDATABASE", container.database)
    .env("ADMINKIT_TEST_BACKEND", "postgres")
    .run_with_trace();

    // Always cleanup container
    tracing::info!("Stopping PostgreSQL container");
    container.stop();

    test_result.wrap_err("PostgreSQL backend validation tests failed")?;

    tracing::info!("PostgreSQL backend validation completed successfully");
    Ok(())
}

/// Verify schema parity between `SQLite` and `PostgreSQL` migrations
///
/// Applies `migrations/` to an in-memory `SQLite` database and
/// `migrations_postgres/` to a Docker-provisioned `PostgreSQL`, introspects
/// both, and fails on any difference in tables, columns, nullability,
/// primary keys, or indexed columns. The container is removed regardless of
/// outcome.
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    tracing::info!("Starting schema parity verification");

    let container = PostgresContainer::VERIFY;
    container.start()?;

    let verification_result = (|| -> Result<()> {
        tracing::info!("Applying SQLite migrations");
        #[allow(clippy::items_after_statements)]
        const SQLITE_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
            embed_migrations!("../crates/persistence/migrations");

        let mut sqlite_conn = SqliteConnection::establish(":memory:")
            .wrap_err("Failed to create SQLite in-memory database")?;
        sqlite_conn
            .run_pending_migrations(SQLITE_MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;

        tracing::info!("Applying PostgreSQL migrations");
        #[allow(clippy::items_after_statements)]
        const POSTGRES_MIGRATIONS: diesel_migrations::EmbeddedMigrations =
            embed_migrations!("../crates/persistence/migrations_postgres");

        let mut pg_conn =
            PgConnection::establish(&container.url()).wrap_err("Failed to connect to PostgreSQL")?;
        pg_conn
            .run_pending_migrations(POSTGRES_MIGRATIONS)
            .map_err(|e| {
                color_eyre::eyre::eyre!("Failed to apply PostgreSQL migrations: {}", e)
            })?;

        tracing::info!("Introspecting schemas");
        let sqlite_schema = introspect_sqlite_schema(&mut sqlite_conn)?;
        let postgres_schema = introspect_postgres_schema(&mut pg_conn)?;

        tracing::info!("Comparing schemas");
        compare_schemas(&sqlite_schema, &postgres_schema)?;

        tracing::info!("Schema parity verification passed");
        Ok(())
    })();

    tracing::info!("Cleaning up PostgreSQL container");
    container.stop();

    verification_result
}

/// Normalized schema representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    indexes: BTreeSet<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

/// Tables managed by diesel itself, excluded from comparison.
const IGNORED_TABLES: [&str; 1] = ["__diesel_schema_migrations"];

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        type_: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .load(conn)
    .wrap_err("Failed to list SQLite tables")?;

    let mut schema = Schema::default();
    for table in tables {
        if IGNORED_TABLES.contains(&table.name.as_str()) {
            continue;
        }

        let columns: Vec<ColumnInfo> = diesel::sql_query(format!(
            "SELECT name, type AS type_, \"notnull\", pk FROM pragma_table_info('{}')",
            table.name
        ))
        .load(conn)
        .wrap_err_with(|| format!("Failed to read columns of '{}'", table.name))?;

        let mut normalized = Table::default();
        for column in columns {
            if column.pk > 0 {
                normalized.primary_keys.insert(column.name.clone());
            }
            normalized.columns.insert(
                column.name,
                Column {
                    normalized_type: normalize_sqlite_type(&column.type_),
                    nullable: column.notnull == 0 && column.pk == 0,
                },
            );
        }

        let indexes: Vec<IndexInfo> = diesel::sql_query(format!(
            "SELECT name, origin FROM pragma_index_list('{}')",
            table.name
        ))
        .load(conn)
        .wrap_err_with(|| format!("Failed to read indexes of '{}'", table.name))?;

        // Primary key indexes are implied by `primary_keys`.
        for index in indexes.into_iter().filter(|i| i.origin != "pk") {
            let columns: Vec<IndexColumnInfo> = diesel::sql_query(format!(
                "SELECT name FROM pragma_index_info('{}') ORDER BY seqno",
                index.name
            ))
            .load(conn)
            .wrap_err_with(|| format!("Failed to read index '{}'", index.name))?;
            normalized
                .indexes
                .insert(columns.into_iter().map(|c| c.name).collect());
        }

        schema.tables.insert(table.name, normalized);
    }

    Ok(schema)
}

/// Introspect `PostgreSQL` schema (the `public` schema only)
fn introspect_postgres_schema(conn: &mut PgConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        table_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
    }

    #[derive(QueryableByName)]
    struct KeyInfo {
        #[diesel(sql_type = Text)]
        table_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        table_name: String,
        #[diesel(sql_type = Text)]
        index_name: String,
        #[diesel(sql_type = Text)]
        column_name: String,
    }

    let columns: Vec<ColumnInfo> = diesel::sql_query(
        "SELECT table_name::text, column_name::text, data_type::text, is_nullable::text \
         FROM information_schema.columns WHERE table_schema = 'public' \
         ORDER BY table_name, ordinal_position",
    )
    .load(conn)
    .wrap_err("Failed to read PostgreSQL columns")?;

    let mut schema = Schema::default();
    for column in columns {
        if IGNORED_TABLES.contains(&column.table_name.as_str()) {
            continue;
        }
        schema
            .tables
            .entry(column.table_name)
            .or_default()
            .columns
            .insert(
                column.column_name,
                Column {
                    normalized_type: normalize_postgres_type(&column.data_type),
                    nullable: column.is_nullable == "YES",
                },
            );
    }

    let keys: Vec<KeyInfo> = diesel::sql_query(
        "SELECT kcu.table_name::text, kcu.column_name::text \
         FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage kcu \
           ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
         WHERE tc.table_schema = 'public' AND tc.constraint_type = 'PRIMARY KEY'",
    )
    .load(conn)
    .wrap_err("Failed to read PostgreSQL primary keys")?;

    for key in keys {
        if let Some(table) = schema.tables.get_mut(&key.table_name) {
            table.primary_keys.insert(key.column_name);
        }
    }

    let index_columns: Vec<IndexInfo> = diesel::sql_query(
        "SELECT t.relname::text AS table_name, i.relname::text AS index_name, \
                a.attname::text AS column_name \
         FROM pg_index ix \
         JOIN pg_class t ON t.oid = ix.indrelid \
         JOIN pg_class i ON i.oid = ix.indexrelid \
         JOIN pg_namespace n ON n.oid = t.relnamespace \
         JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) ON true \
         JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
         WHERE n.nspname = 'public' AND NOT ix.indisprimary \
         ORDER BY t.relname, i.relname, k.ord",
    )
    .load(conn)
    .wrap_err("Failed to read PostgreSQL indexes")?;

    let mut grouped: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for row in index_columns {
        grouped
            .entry((row.table_name, row.index_name))
            .or_default()
            .push(row.column_name);
    }
    for ((table_name, _), columns) in grouped {
        if let Some(table) = schema.tables.get_mut(&table_name) {
            table.indexes.insert(columns);
        }
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string() // Default for SQLite
    }
}

/// Normalize `PostgreSQL` type to common representation
#[allow(clippy::match_same_arms)]
fn normalize_postgres_type(postgres_type: &str) -> String {
    match postgres_type {
        "smallint" | "integer" | "bigint" => "integer".to_string(),
        "real" | "double precision" | "numeric" => "real".to_string(),
        "bytea" => "blob".to_string(),
        _ => "text".to_string(),
    }
}

/// Compare schemas and fail on the first mismatch
fn compare_schemas(sqlite_schema: &Schema, postgres_schema: &Schema) -> Result<()> {
    let sqlite_tables: BTreeSet<_> = sqlite_schema.tables.keys().collect();
    let postgres_tables: BTreeSet<_> = postgres_schema.tables.keys().collect();

    if sqlite_tables != postgres_tables {
        return Err(color_eyre::eyre::eyre!(
            "Schema parity check FAILED: Table mismatch\n  SQLite: {:?}\n  PostgreSQL: {:?}",
            sqlite_tables,
            postgres_tables
        ));
    }

    for table_name in sqlite_tables {
        let sqlite_table = &sqlite_schema.tables[table_name];
        let postgres_table = &postgres_schema.tables[table_name];

        if sqlite_table.columns != postgres_table.columns {
            return Err(color_eyre::eyre::eyre!(
                "Schema parity check FAILED: Column mismatch in table '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                table_name,
                sqlite_table.columns,
                postgres_table.columns
            ));
        }

        if sqlite_table.primary_keys != postgres_table.primary_keys {
            return Err(color_eyre::eyre::eyre!(
                "Schema parity check FAILED: Primary key mismatch in table '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                table_name,
                sqlite_table.primary_keys,
                postgres_table.primary_keys
            ));
        }

        // Compared by columns, not by name since names may differ
        if sqlite_table.indexes != postgres_table.indexes {
            return Err(color_eyre::eyre::eyre!(
                "Schema parity check FAILED: Index mismatch in table '{}'\n  SQLite: {:?}\n  PostgreSQL: {:?}",
                table_name,
                sqlite_table.indexes,
                postgres_table.indexes
            ));
        }
    }

    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
