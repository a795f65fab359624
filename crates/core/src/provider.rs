// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_domain::{ManagedUser, Role, UserId};
use std::future::Future;
use thiserror::Error;

/// A failure reported by the identity provider for a single operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// The provider's message. May be empty.
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external service that owns user accounts.
///
/// Each operation acts on exactly one user. Implementations are free to
/// perform network I/O; the returned futures must be `Send` so batches can
/// be driven from any runtime worker.
pub trait IdentityProvider: Send + Sync {
    /// Bans a user with an optional reason.
    fn ban_user(
        &self,
        id: &UserId,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Lifts a user's ban.
    fn unban_user(&self, id: &UserId) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Assigns a role to a user.
    fn set_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Deletes a user.
    fn delete_user(&self, id: &UserId) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Looks up the given users. Unknown ids are omitted from the result.
    fn describe_users(
        &self,
        ids: &[UserId],
    ) -> impl Future<Output = Result<Vec<ManagedUser>, ProviderError>> + Send;
}
