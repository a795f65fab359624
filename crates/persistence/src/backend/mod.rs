// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! This module isolates everything that differs between the embedded and
//! client-server engines: connection setup, migrations, pooling and the
//! monomorphic Diesel calls that execute a rendered statement.
//!
//! ## Backend Support
//!
//! - `sqlite`: embedded `SQLite` (default for development and testing)
//! - `postgres`: `PostgreSQL` (validated via opt-in tests)
//!
//! Dialect selection happens once per call, in [`DatabaseConnector::open`],
//! from the descriptor's kind. Nothing above this module branches on the
//! backend.

pub mod postgres;
pub mod sqlite;

use diesel::backend::Backend;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::serialize::ToSql;
use diesel::sql_types::{BigInt, HasSqlType, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel::{PgConnection, QueryableByName, RunQueryDsl, SqliteConnection};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{BackendDescriptor, ConfigError};
use crate::connection::{Connector, SqlConnection, SqlValue, check_arity};
use crate::dialect::{Dialect, Statement};
use crate::error::PersistenceError;
use postgres::PgPool;

/// Default maximum size of each `PostgreSQL` pool.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Default time to wait for a pooled connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Binds parameters to a boxed raw query in order.
fn bind_params<'a, DB>(
    mut query: BoxedSqlQuery<'a, DB, SqlQuery>,
    params: Vec<SqlValue>,
) -> BoxedSqlQuery<'a, DB, SqlQuery>
where
    DB: Backend + HasSqlType<Text> + HasSqlType<Nullable<Text>> + HasSqlType<BigInt>,
    String: ToSql<Text, DB>,
    Option<String>: ToSql<Nullable<Text>, DB>,
    i64: ToSql<BigInt, DB>,
{
    for param in params {
        query = match param {
            SqlValue::Text(value) => query.bind::<Text, _>(value),
            SqlValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
            SqlValue::BigInt(value) => query.bind::<BigInt, _>(value),
        };
    }
    query
}

backend_fn! {
    /// Runs a rendered query and decodes its rows.
    fn load_rows[T: QueryableByName<Sqlite> + QueryableByName<Pg> + 'static](
        conn: &mut _,
        sql: String,
        params: Vec<SqlValue>,
    ) -> Result<Vec<T>, PersistenceError> {
        let query: BoxedSqlQuery<'static, Db, SqlQuery> =
            bind_params(diesel::sql_query(sql).into_boxed(), params);
        Ok(query.load::<T>(conn)?)
    }
}

backend_fn! {
    /// Executes a rendered statement.
    fn execute_rows(
        conn: &mut _,
        sql: String,
        params: Vec<SqlValue>,
    ) -> Result<usize, PersistenceError> {
        let query: BoxedSqlQuery<'static, Db, SqlQuery> =
            bind_params(diesel::sql_query(sql).into_boxed(), params);
        Ok(query.execute(conn)?)
    }
}

/// A connection produced by [`DatabaseConnector`].
pub enum DatabaseConnection {
    /// A dedicated embedded connection, closed after the call.
    Sqlite(SqliteConnection),
    /// A pooled client-server connection, returned to its pool after the
    /// call.
    Postgres(PooledConnection<ConnectionManager<PgConnection>>),
}

impl SqlConnection for DatabaseConnection {
    fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite(_) => Dialect::Sqlite,
            Self::Postgres(_) => Dialect::Postgres,
        }
    }

    fn query<T>(
        &mut self,
        statement: &Statement,
        params: Vec<SqlValue>,
    ) -> Result<Vec<T>, PersistenceError>
    where
        T: QueryableByName<Sqlite> + QueryableByName<Pg> + 'static,
    {
        check_arity(statement, &params)?;
        let sql: String = statement.render(self.dialect());
        debug!(dialect = %self.dialect(), sql = %sql, "Running query");
        match self {
            Self::Sqlite(conn) => load_rows_sqlite::<T>(conn, sql, params),
            Self::Postgres(conn) => load_rows_pg::<T>(conn, sql, params),
        }
    }

    fn execute(
        &mut self,
        statement: &Statement,
        params: Vec<SqlValue>,
    ) -> Result<usize, PersistenceError> {
        check_arity(statement, &params)?;
        let sql: String = statement.render(self.dialect());
        debug!(dialect = %self.dialect(), sql = %sql, "Executing statement");
        match self {
            Self::Sqlite(conn) => execute_rows_sqlite(conn, sql, params),
            Self::Postgres(conn) => execute_rows_pg(conn, sql, params),
        }
    }

    fn close(self) -> Result<(), PersistenceError> {
        // Dropping closes the embedded handle or returns the pooled one.
        let dialect: Dialect = self.dialect();
        drop(self);
        debug!(%dialect, "Connection released");
        Ok(())
    }
}

/// Opens connections for embedded and client-server descriptors.
///
/// Embedded connections are established per call. Client-server pools are
/// cached per connection string until [`evict_pools`](Self::evict_pools).
pub struct DatabaseConnector {
    pools: Mutex<HashMap<String, PgPool>>,
    pool_size: u32,
    connect_timeout: Duration,
}

impl std::fmt::Debug for DatabaseConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnector")
            .field("pools", &self.lock_pools().len())
            .field("pool_size", &self.pool_size)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for DatabaseConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseConnector {
    /// Creates a connector with default pool settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the maximum size of each client-server pool.
    #[must_use]
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Sets how long to wait for a client-server connection.
    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Drops every cached pool. Call after reconfiguration.
    pub fn evict_pools(&self) {
        let evicted: usize = {
            let mut pools: MutexGuard<'_, HashMap<String, PgPool>> = self.lock_pools();
            let count: usize = pools.len();
            pools.clear();
            count
        };
        info!(evicted, "Evicted PostgreSQL pools");
    }

    /// Returns how many client-server pools are cached.
    #[must_use]
    pub fn cached_pools(&self) -> usize {
        self.lock_pools().len()
    }

    fn lock_pools(&self) -> MutexGuard<'_, HashMap<String, PgPool>> {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pool_for(&self, conninfo: &str) -> Result<PgPool, PersistenceError> {
        if let Some(pool) = self.lock_pools().get(conninfo) {
            return Ok(pool.clone());
        }
        // Built outside the lock; a concurrent builder for the same key
        // loses and its pool is dropped.
        let pool: PgPool = postgres::build_pool(conninfo, self.pool_size, self.connect_timeout)?;
        Ok(self
            .lock_pools()
            .entry(conninfo.to_string())
            .or_insert(pool)
            .clone())
    }
}

impl Connector for DatabaseConnector {
    type Conn = DatabaseConnection;

    fn reconfigured(&self) {
        self.evict_pools();
    }

    fn open(&self, descriptor: &BackendDescriptor) -> Result<DatabaseConnection, PersistenceError> {
        descriptor.validate()?;
        match descriptor {
            BackendDescriptor::Embedded { path } => {
                Ok(DatabaseConnection::Sqlite(sqlite::open(path)?))
            }
            BackendDescriptor::ClientServer { host, database, .. } => {
                let conninfo: String = postgres::connection_string(descriptor).ok_or_else(|| {
                    ConfigError::InvalidDescriptor(String::from("not a client-server descriptor"))
                })?;
                debug!(host = %host, database = %database, "Opening PostgreSQL connection");
                let pool: PgPool = self.pool_for(&conninfo)?;
                let conn = pool
                    .get()
                    .map_err(|e| PersistenceError::ConnectionFailed(e.to_string()))?;
                Ok(DatabaseConnection::Postgres(conn))
            }
        }
    }
}
