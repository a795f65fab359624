// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fan-out of one administrative action over many users.
//!
//! A batch moves through [`BatchPhase`]s in a fixed order. Every target is
//! dispatched concurrently and the orchestrator waits for all of them; a
//! failure on one target neither cancels nor rolls back the others. Only a
//! batch in which every target succeeded produces an activity event.

use adminkit_audit::{ActivityEvent, NewActivity};
use adminkit_domain::{BulkAction, BulkActionRequest, BulkIntent, ManagedUser, UserId};
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::provider::{IdentityProvider, ProviderError};
use crate::recorder::ActivityRecorder;

/// The lifecycle of a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    /// The request has been accepted.
    Received,
    /// Provider calls are in flight.
    Dispatching,
    /// Every target succeeded.
    AllSucceeded,
    /// At least one target failed.
    PartiallyFailed,
    /// The outcome has been reported to the caller.
    Reported,
}

/// One target whose provider call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    /// The user the call was made for.
    pub target: UserId,
    /// What the provider reported.
    pub error: ProviderError,
}

/// A batch in which one or more targets failed.
///
/// `message` is the error surfaced to the caller: the first failure in
/// target order, or the intent's fallback message when that failure carried
/// no text. Every failure is retained in `failures`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PartialBatchFailure {
    /// The intent of the failed batch.
    pub intent: BulkIntent,
    /// The error reported for the batch.
    pub message: String,
    /// All failed targets, in target order.
    pub failures: Vec<TargetFailure>,
    /// How many targets succeeded.
    pub succeeded: usize,
}

impl PartialBatchFailure {
    fn from_failures(intent: BulkIntent, failures: Vec<TargetFailure>, succeeded: usize) -> Self {
        let message: String = failures
            .first()
            .map(|failure| failure.error.message.trim())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| intent.failure_message())
            .to_string();
        Self {
            intent,
            message,
            failures,
            succeeded,
        }
    }
}

/// How a batch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// There were no targets; nothing was dispatched or recorded.
    Skipped,
    /// Every target succeeded. Carries the recorded activity when one was
    /// written.
    Completed {
        /// The activity written for this batch, if any.
        activity: Option<ActivityEvent>,
    },
    /// At least one target failed. No activity was recorded.
    PartiallyFailed(PartialBatchFailure),
}

/// The result of executing a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    /// The intent that was executed.
    pub intent: BulkIntent,
    /// The number of distinct targets.
    pub targets: usize,
    /// How the batch ended.
    pub outcome: BatchOutcome,
}

impl BulkReport {
    /// Returns whether the batch is reported as successful.
    ///
    /// An empty batch counts as successful.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self.outcome, BatchOutcome::PartiallyFailed(_))
    }

    /// Returns the error message for a failed batch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::PartiallyFailed(failure) => Some(failure.message.as_str()),
            BatchOutcome::Skipped | BatchOutcome::Completed { .. } => None,
        }
    }
}

/// Executes bulk requests against an identity provider and records one
/// activity per fully successful batch.
#[derive(Debug)]
pub struct BulkOrchestrator<P, R> {
    provider: P,
    recorder: R,
}

impl<P: IdentityProvider, R: ActivityRecorder> BulkOrchestrator<P, R> {
    /// Creates an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `provider` - The identity provider that applies each per-user call
    /// * `recorder` - Where the batch activity is written
    #[must_use]
    pub const fn new(provider: P, recorder: R) -> Self {
        Self { provider, recorder }
    }

    /// Returns the identity provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Executes a bulk request.
    ///
    /// Target descriptions are fetched before dispatch so the audit entry
    /// names users that may no longer exist afterwards (bulk delete).
    ///
    /// # Arguments
    ///
    /// * `actor` - Display name of the administrator, recorded on the activity
    /// * `request` - The action and its targets
    pub async fn execute(&self, actor: &str, request: &BulkActionRequest) -> BulkReport {
        let intent: BulkIntent = request.intent();
        let targets: usize = request.len();
        debug!(phase = ?BatchPhase::Received, %intent, targets, "Bulk request received");

        if request.is_empty() {
            debug!(phase = ?BatchPhase::Reported, %intent, "No targets, skipping batch");
            return BulkReport {
                intent,
                targets,
                outcome: BatchOutcome::Skipped,
            };
        }

        let description: String = self.describe_targets(request.target_ids()).await;

        debug!(phase = ?BatchPhase::Dispatching, %intent, targets, "Dispatching provider calls");
        let results: Vec<Result<(), ProviderError>> = join_all(
            request
                .target_ids()
                .iter()
                .map(|id| self.dispatch(request.action(), id)),
        )
        .await;

        let mut failures: Vec<TargetFailure> = Vec::new();
        for (id, result) in request.target_ids().iter().zip(results) {
            if let Err(error) = result {
                warn!(%intent, target = %id, error = %error, "Provider call failed");
                failures.push(TargetFailure {
                    target: id.clone(),
                    error,
                });
            }
        }

        let outcome: BatchOutcome = if failures.is_empty() {
            debug!(phase = ?BatchPhase::AllSucceeded, %intent, targets);
            let activity: Option<ActivityEvent> =
                self.record_batch(actor, request.action(), description).await;
            BatchOutcome::Completed { activity }
        } else {
            debug!(
                phase = ?BatchPhase::PartiallyFailed,
                %intent,
                failed = failures.len(),
                targets
            );
            let succeeded: usize = targets - failures.len();
            BatchOutcome::PartiallyFailed(PartialBatchFailure::from_failures(
                intent, failures, succeeded,
            ))
        };

        info!(
            phase = ?BatchPhase::Reported,
            %intent,
            targets,
            success = !matches!(outcome, BatchOutcome::PartiallyFailed(_)),
            "Bulk request finished"
        );
        BulkReport {
            intent,
            targets,
            outcome,
        }
    }

    async fn dispatch(&self, action: &BulkAction, id: &UserId) -> Result<(), ProviderError> {
        match action {
            BulkAction::Ban { reason } => self.provider.ban_user(id, reason.as_deref()).await,
            BulkAction::Unban => self.provider.unban_user(id).await,
            BulkAction::ChangeRole { role } => self.provider.set_role(id, *role).await,
            BulkAction::Delete => self.provider.delete_user(id).await,
        }
    }

    async fn describe_targets(&self, ids: &[UserId]) -> String {
        let fallback = || format!("{} users", ids.len());
        match self.provider.describe_users(ids).await {
            Ok(users) if !users.is_empty() => users
                .iter()
                .map(|user: &ManagedUser| user.email.as_str())
                .collect::<Vec<&str>>()
                .join(", "),
            Ok(_) => fallback(),
            Err(e) => {
                warn!(error = %e, "Could not describe bulk targets");
                fallback()
            }
        }
    }

    async fn record_batch(
        &self,
        actor: &str,
        action: &BulkAction,
        description: String,
    ) -> Option<ActivityEvent> {
        let activity: NewActivity = NewActivity::new(action.summary(), actor, action.activity_type())
            .with_target(description);
        match self.recorder.record(activity).await {
            Ok(event) => event,
            Err(e) => {
                warn!(intent = %action.intent(), error = %e, "Failed to record bulk activity");
                None
            }
        }
    }
}
