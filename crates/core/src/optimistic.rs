// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Optimistic updates of a locally held entity collection.
//!
//! A mutation is applied to the local view before the server has answered.
//! The pre-mutation view is kept as a snapshot and the mutation is then
//! either confirmed or reverted, exactly once. A target key may only be
//! touched by one in-flight mutation at a time.

use adminkit_domain::{BulkAction, BulkActionRequest, ManagedUser, Role, UserId, UserPatch};
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::{ConflictError, ReconcileError};

/// An entity identified by a stable key.
pub trait Keyed: Clone + Send {
    /// The key type.
    type Key: Clone + Eq + Hash + Display + Debug + Send;

    /// Returns this entity's key.
    fn key(&self) -> &Self::Key;
}

impl Keyed for ManagedUser {
    type Key = UserId;

    fn key(&self) -> &UserId {
        &self.id
    }
}

/// A change to a collection of keyed entities.
pub trait Mutation<E: Keyed> {
    /// Keys of the entities this mutation touches.
    fn targets(&self) -> Vec<E::Key>;

    /// Applies the mutation to the collection.
    fn apply_to(&self, view: &mut Vec<E>);
}

#[derive(Debug)]
struct ViewState<E: Keyed> {
    view: Vec<E>,
    pending: HashSet<E::Key>,
    // Bumped by every begin and refresh.
    version: u64,
}

/// Holds a local view of entities and reconciles optimistic mutations
/// against server outcomes.
///
/// Cloning yields another handle onto the same view.
#[derive(Debug)]
pub struct Reconciler<E: Keyed> {
    state: Arc<Mutex<ViewState<E>>>,
}

impl<E: Keyed> Clone for Reconciler<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock<E: Keyed>(state: &Mutex<ViewState<E>>) -> MutexGuard<'_, ViewState<E>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E: Keyed> Reconciler<E> {
    /// Creates a reconciler over an initial view.
    #[must_use]
    pub fn new(entities: Vec<E>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewState {
                view: entities,
                pending: HashSet::new(),
                version: 0,
            })),
        }
    }

    /// Returns a copy of the current view.
    #[must_use]
    pub fn view(&self) -> Vec<E> {
        lock(&self.state).view.clone()
    }

    /// Returns whether any mutation is in flight.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !lock(&self.state).pending.is_empty()
    }

    /// Replaces the view with fresh server data.
    ///
    /// Entities with an in-flight mutation keep their local state.
    pub fn refresh(&self, entities: Vec<E>) {
        let mut state: MutexGuard<'_, ViewState<E>> = lock(&self.state);
        state.version += 1;
        let ViewState { view, pending, .. } = &mut *state;
        let mut merged: Vec<E> = entities
            .into_iter()
            .filter(|entity| !pending.contains(entity.key()))
            .collect();
        merged.extend(
            view.iter()
                .filter(|entity| pending.contains(entity.key()))
                .cloned(),
        );
        *view = merged;
    }

    /// Applies a mutation optimistically.
    ///
    /// # Errors
    ///
    /// Returns an error, without touching the view, if any target already
    /// has a mutation in flight.
    pub fn begin<M: Mutation<E>>(&self, mutation: &M) -> Result<PendingMutation<E>, ConflictError> {
        let targets: Vec<E::Key> = mutation.targets();
        let mut state: MutexGuard<'_, ViewState<E>> = lock(&self.state);

        let conflicts: Vec<String> = targets
            .iter()
            .filter(|key| state.pending.contains(*key))
            .map(ToString::to_string)
            .collect();
        if !conflicts.is_empty() {
            return Err(ConflictError { keys: conflicts });
        }

        let exclusive: bool = state.pending.is_empty();
        state.version += 1;
        let exclusive_version: Option<u64> = exclusive.then_some(state.version);
        let snapshot: Vec<E> = state.view.clone();
        mutation.apply_to(&mut state.view);
        state.pending.extend(targets.iter().cloned());
        drop(state);
        debug!(targets = targets.len(), "Optimistic mutation applied");

        Ok(PendingMutation {
            state: Arc::clone(&self.state),
            snapshot,
            targets,
            exclusive_version,
            resolved: false,
        })
    }

    /// Applies a mutation optimistically, sends it, and confirms or reverts
    /// depending on the result.
    ///
    /// `send` resolves to the server's copy of the affected entities when it
    /// returns them, or `None` to keep the optimistic state.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Conflict`] if the mutation overlaps one in
    /// flight, or [`ReconcileError::Rejected`] with the send error after the
    /// view has been reverted.
    pub async fn apply<M, F, S>(&self, mutation: &M, send: F) -> Result<(), ReconcileError<S>>
    where
        M: Mutation<E>,
        F: Future<Output = Result<Option<Vec<E>>, S>>,
    {
        let pending: PendingMutation<E> = self.begin(mutation)?;
        match send.await {
            Ok(confirmed) => {
                pending.confirm(confirmed);
                Ok(())
            }
            Err(e) => {
                pending.revert();
                Err(ReconcileError::Rejected(e))
            }
        }
    }
}

/// An optimistic mutation awaiting its server outcome.
///
/// Resolved exactly once by [`confirm`](Self::confirm) or
/// [`revert`](Self::revert). Dropping it unresolved reverts it.
#[derive(Debug)]
#[must_use = "an unresolved mutation is reverted when dropped"]
pub struct PendingMutation<E: Keyed> {
    state: Arc<Mutex<ViewState<E>>>,
    snapshot: Vec<E>,
    targets: Vec<E::Key>,
    // Set when nothing else was in flight at begin.
    exclusive_version: Option<u64>,
    resolved: bool,
}

impl<E: Keyed> PendingMutation<E> {
    /// Returns the view as it was before this mutation.
    #[must_use]
    pub fn snapshot(&self) -> &[E] {
        &self.snapshot
    }

    /// Keeps the mutation, optionally replacing the affected entities with
    /// the server's copies.
    ///
    /// Confirmed entities whose key is not a target of this mutation are
    /// ignored.
    pub fn confirm(mut self, confirmed: Option<Vec<E>>) {
        let mut state: MutexGuard<'_, ViewState<E>> = lock(&self.state);
        for entity in confirmed.into_iter().flatten() {
            if !self.targets.contains(entity.key()) {
                continue;
            }
            match state.view.iter().position(|e| e.key() == entity.key()) {
                Some(index) => state.view[index] = entity,
                None => state.view.push(entity),
            }
        }
        for key in &self.targets {
            state.pending.remove(key);
        }
        drop(state);
        self.resolved = true;
    }

    /// Restores the pre-mutation state.
    pub fn revert(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.resolved {
            return;
        }
        self.resolved = true;

        let mut state: MutexGuard<'_, ViewState<E>> = lock(&self.state);
        for key in &self.targets {
            state.pending.remove(key);
        }

        if self.exclusive_version == Some(state.version) {
            state.view.clone_from(&self.snapshot);
            drop(state);
            debug!("Optimistic mutation reverted to snapshot");
            return;
        }

        // The view has moved on since begin; restore only our targets.
        for key in &self.targets {
            let current: Option<usize> = state.view.iter().position(|e| e.key() == key);
            let original: Option<(usize, &E)> = self
                .snapshot
                .iter()
                .enumerate()
                .find(|(_, e)| e.key() == key);
            match (current, original) {
                (Some(index), Some((_, entity))) => state.view[index] = entity.clone(),
                (None, Some((index, entity))) => {
                    let at: usize = index.min(state.view.len());
                    state.view.insert(at, entity.clone());
                }
                (Some(index), None) => {
                    state.view.remove(index);
                }
                (None, None) => {}
            }
        }
        drop(state);
        debug!(targets = self.targets.len(), "Optimistic mutation reverted for its targets");
    }
}

impl<E: Keyed> Drop for PendingMutation<E> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Optimistic changes to the user table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMutation {
    /// Edit one user's profile fields.
    Update {
        /// The user to edit.
        id: UserId,
        /// The fields to change.
        patch: UserPatch,
    },
    /// Ban users.
    Ban {
        /// The users to ban.
        ids: Vec<UserId>,
        /// The ban reason.
        reason: Option<String>,
    },
    /// Lift bans.
    Unban {
        /// The users to unban.
        ids: Vec<UserId>,
    },
    /// Change users' role.
    SetRole {
        /// The users to change.
        ids: Vec<UserId>,
        /// The new role.
        role: Role,
    },
    /// Remove users from the view.
    Remove {
        /// The users to remove.
        ids: Vec<UserId>,
    },
    /// Add a newly created user to the front of the view.
    Insert(ManagedUser),
}

impl Mutation<ManagedUser> for UserMutation {
    fn targets(&self) -> Vec<UserId> {
        match self {
            Self::Update { id, .. } => vec![id.clone()],
            Self::Ban { ids, .. }
            | Self::Unban { ids }
            | Self::SetRole { ids, .. }
            | Self::Remove { ids } => ids.clone(),
            Self::Insert(user) => vec![user.id.clone()],
        }
    }

    fn apply_to(&self, view: &mut Vec<ManagedUser>) {
        match self {
            Self::Update { id, patch } => {
                for user in view.iter_mut().filter(|u| &u.id == id) {
                    patch.apply_to(user);
                }
            }
            Self::Ban { ids, reason } => {
                for user in view.iter_mut().filter(|u| ids.contains(&u.id)) {
                    user.ban(reason.as_deref());
                }
            }
            Self::Unban { ids } => {
                for user in view.iter_mut().filter(|u| ids.contains(&u.id)) {
                    user.unban();
                }
            }
            Self::SetRole { ids, role } => {
                for user in view.iter_mut().filter(|u| ids.contains(&u.id)) {
                    user.role = *role;
                }
            }
            Self::Remove { ids } => view.retain(|u| !ids.contains(&u.id)),
            Self::Insert(user) => view.insert(0, user.clone()),
        }
    }
}

impl From<&BulkActionRequest> for UserMutation {
    fn from(request: &BulkActionRequest) -> Self {
        let ids: Vec<UserId> = request.target_ids().to_vec();
        match request.action() {
            BulkAction::Ban { reason } => Self::Ban {
                ids,
                reason: reason.clone(),
            },
            BulkAction::Unban => Self::Unban { ids },
            BulkAction::ChangeRole { role } => Self::SetRole { ids, role: *role },
            BulkAction::Delete => Self::Remove { ids },
        }
    }
}
