// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// A mutation was attempted on keys that already have one in flight.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("a mutation is already pending for: {}", .keys.join(", "))]
pub struct ConflictError {
    /// The keys that are already pending.
    pub keys: Vec<String>,
}

/// Errors from [`Reconciler::apply`](crate::Reconciler::apply).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError<S> {
    /// The mutation overlaps one already in flight; nothing was applied.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    /// The server rejected the mutation; the view has been reverted.
    #[error("mutation rejected: {0}")]
    Rejected(S),
}
