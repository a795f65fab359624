// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The connection adapter seam.
//!
//! Callers hand a [`Statement`] and its parameters to a [`SqlConnection`];
//! the connection renders the statement for its own dialect. Which dialect
//! that is depends only on the descriptor passed to [`Connector::open`].

use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::sqlite::Sqlite;

use crate::config::BackendDescriptor;
use crate::dialect::{Dialect, Statement};
use crate::error::PersistenceError;

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// A text value.
    Text(String),
    /// SQL `NULL` in a text column.
    Null,
    /// A 64-bit integer.
    BigInt(i64),
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

/// An open database connection that speaks one dialect.
pub trait SqlConnection {
    /// The dialect statements are rendered in.
    fn dialect(&self) -> Dialect;

    /// Runs a query and decodes every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter count does not match the
    /// statement or the query fails.
    fn query<T>(
        &mut self,
        statement: &Statement,
        params: Vec<SqlValue>,
    ) -> Result<Vec<T>, PersistenceError>
    where
        T: QueryableByName<Sqlite> + QueryableByName<Pg> + 'static;

    /// Executes a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter count does not match the
    /// statement or execution fails.
    fn execute(
        &mut self,
        statement: &Statement,
        params: Vec<SqlValue>,
    ) -> Result<usize, PersistenceError>;

    /// Releases the connection.
    ///
    /// Embedded connections are closed; pooled connections are returned to
    /// their pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection could not be released cleanly.
    fn close(self) -> Result<(), PersistenceError>
    where
        Self: Sized;
}

/// Opens connections for a backend descriptor.
pub trait Connector: Send + Sync {
    /// The connection type produced.
    type Conn: SqlConnection;

    /// Opens a connection to the described backend.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::ConnectionFailed`] if the backend cannot
    /// be reached or rejects the credentials, and a configuration error if
    /// the descriptor is invalid. Failures are never retried.
    fn open(&self, descriptor: &BackendDescriptor) -> Result<Self::Conn, PersistenceError>;

    /// Releases anything cached for an earlier configuration.
    fn reconfigured(&self) {}
}

/// Fails if `params` does not supply exactly one value per placeholder.
///
/// # Errors
///
/// Returns [`PersistenceError::ParameterMismatch`] on a count mismatch.
pub fn check_arity(statement: &Statement, params: &[SqlValue]) -> Result<(), PersistenceError> {
    let expected: usize = statement.placeholder_count();
    if expected == params.len() {
        Ok(())
    } else {
        Err(PersistenceError::ParameterMismatch {
            expected,
            actual: params.len(),
        })
    }
}
