// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! User administration workflows.
//!
//! This crate knows nothing about storage. It talks to the identity provider
//! through [`IdentityProvider`] and hands finished activities to an
//! [`ActivityRecorder`], which the persistence layer implements.

mod bulk;
mod error;
mod memory;
mod optimistic;
mod provider;
mod recorder;

#[cfg(test)]
mod tests;

pub use bulk::{
    BatchOutcome, BatchPhase, BulkOrchestrator, BulkReport, PartialBatchFailure, TargetFailure,
};
pub use error::{ConflictError, ReconcileError};
pub use memory::MemoryDirectory;
pub use optimistic::{Keyed, Mutation, PendingMutation, Reconciler, UserMutation};
pub use provider::{IdentityProvider, ProviderError};
pub use recorder::ActivityRecorder;
