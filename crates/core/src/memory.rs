// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_domain::{ManagedUser, Role, UserId};
use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::provider::{IdentityProvider, ProviderError};

/// An in-process identity provider.
///
/// Holds users in memory and supports injecting a failure for specific ids,
/// which makes partial batch failures reproducible.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: Mutex<Vec<ManagedUser>>,
    failures: Mutex<HashMap<UserId, String>>,
    calls: AtomicUsize,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with users.
    #[must_use]
    pub fn with_users(users: Vec<ManagedUser>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    /// Returns a copy of every user.
    #[must_use]
    pub fn users(&self) -> Vec<ManagedUser> {
        self.lock_users().clone()
    }

    /// Returns a copy of one user.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<ManagedUser> {
        self.lock_users().iter().find(|u| &u.id == id).cloned()
    }

    /// Makes every subsequent mutating call for `id` fail with `message`.
    pub fn fail_for(&self, id: UserId, message: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, message.into());
    }

    /// Returns how many mutating calls have been made.
    #[must_use]
    pub fn mutation_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock_users(&self) -> MutexGuard<'_, Vec<ManagedUser>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(
        &self,
        id: &UserId,
        change: impl FnOnce(&mut Vec<ManagedUser>, usize),
    ) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Err(ProviderError::new(message.clone()));
        }
        let mut users: MutexGuard<'_, Vec<ManagedUser>> = self.lock_users();
        let index: usize = users
            .iter()
            .position(|u| &u.id == id)
            .ok_or_else(|| ProviderError::new(format!("User {id} not found")))?;
        change(&mut users, index);
        drop(users);
        Ok(())
    }
}

impl IdentityProvider for MemoryDirectory {
    fn ban_user(
        &self,
        id: &UserId,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(self.mutate(id, |users, i| users[i].ban(reason)))
    }

    fn unban_user(&self, id: &UserId) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(self.mutate(id, |users, i| users[i].unban()))
    }

    fn set_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(self.mutate(id, |users, i| users[i].role = role))
    }

    fn delete_user(&self, id: &UserId) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(self.mutate(id, |users, i| {
            users.remove(i);
        }))
    }

    fn describe_users(
        &self,
        ids: &[UserId],
    ) -> impl Future<Output = Result<Vec<ManagedUser>, ProviderError>> + Send {
        let users: MutexGuard<'_, Vec<ManagedUser>> = self.lock_users();
        let found: Vec<ManagedUser> = ids
            .iter()
            .filter_map(|id| users.iter().find(|u| &u.id == id).cloned())
            .collect();
        drop(users);
        ready(Ok(found))
    }
}
