// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_audit::NewActivity;
use adminkit_domain::{
    ActivityType, BulkAction, BulkActionRequest, BulkIntent, ManagedUser, Role, UserId,
};
use std::future::{Future, ready};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

use crate::tests::helpers::{
    FailingRecorder, RecordingRecorder, create_test_directory, user_id,
};
use crate::{
    BatchOutcome, BulkOrchestrator, BulkReport, IdentityProvider, MemoryDirectory, ProviderError,
};

fn request(action: BulkAction, ids: &[&str]) -> BulkActionRequest {
    BulkActionRequest::new(action, ids.iter().map(|id| user_id(id)))
}

#[tokio::test]
async fn test_all_succeed_records_exactly_one_activity() {
    let recorder: Arc<RecordingRecorder> = Arc::new(RecordingRecorder::default());
    let orchestrator = BulkOrchestrator::new(create_test_directory(), Arc::clone(&recorder));

    let report: BulkReport = orchestrator
        .execute(
            "Root Admin",
            &request(BulkAction::Ban { reason: Some(String::from("spam")) }, &["u1", "u2"]),
        )
        .await;

    assert!(report.is_success());
    assert_eq!(report.error(), None);
    assert!(matches!(
        report.outcome,
        BatchOutcome::Completed { activity: Some(_) }
    ));

    let recorded: Vec<NewActivity> = recorder.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].action, "Banned multiple users");
    assert_eq!(recorded[0].actor, "Root Admin");
    assert_eq!(recorded[0].activity_type, ActivityType::Ban);
    assert_eq!(recorded[0].target.as_deref(), Some("a@x, b@x"));

    let banned: ManagedUser = orchestrator.provider().user(&user_id("u2")).unwrap();
    assert!(banned.banned);
    assert_eq!(banned.ban_reason.as_deref(), Some("spam"));
}

#[tokio::test]
async fn test_one_failure_reports_error_and_records_nothing() {
    let directory: MemoryDirectory = create_test_directory();
    directory.fail_for(user_id("u2"), "cannot ban admin");
    let recorder: Arc<RecordingRecorder> = Arc::new(RecordingRecorder::default());
    let orchestrator = BulkOrchestrator::new(directory, Arc::clone(&recorder));

    let report: BulkReport = orchestrator
        .execute("root", &request(BulkAction::Ban { reason: None }, &["u1", "u2"]))
        .await;

    assert!(!report.is_success());
    assert_eq!(report.error(), Some("cannot ban admin"));
    assert!(recorder.recorded().is_empty());

    // Applied mutations are not rolled back.
    assert!(orchestrator.provider().user(&user_id("u1")).unwrap().banned);
}

#[tokio::test]
async fn test_first_failure_in_target_order_is_reported() {
    let directory: MemoryDirectory = create_test_directory();
    directory.fail_for(user_id("u3"), "third");
    directory.fail_for(user_id("u1"), "first");
    let orchestrator = BulkOrchestrator::new(directory, RecordingRecorder::default());

    let report: BulkReport = orchestrator
        .execute("root", &request(BulkAction::Unban, &["u1", "u2", "u3"]))
        .await;

    assert_eq!(report.error(), Some("first"));
    let BatchOutcome::PartiallyFailed(failure) = report.outcome else {
        panic!("expected a partial failure");
    };
    assert_eq!(failure.failures.len(), 2);
    assert_eq!(failure.failures[1].target, user_id("u3"));
    assert_eq!(failure.succeeded, 1);
}

#[tokio::test]
async fn test_empty_provider_message_falls_back_to_intent_message() {
    let directory: MemoryDirectory = create_test_directory();
    directory.fail_for(user_id("u1"), "");
    let orchestrator = BulkOrchestrator::new(directory, RecordingRecorder::default());

    let report: BulkReport = orchestrator
        .execute(
            "root",
            &request(BulkAction::ChangeRole { role: Role::Admin }, &["u1"]),
        )
        .await;

    assert_eq!(report.error(), Some("Failed to update user roles"));
    assert_eq!(report.intent, BulkIntent::Role);
}

#[tokio::test]
async fn test_empty_targets_skip_dispatch_and_audit() {
    let recorder: Arc<RecordingRecorder> = Arc::new(RecordingRecorder::default());
    let orchestrator = BulkOrchestrator::new(create_test_directory(), Arc::clone(&recorder));

    let report: BulkReport = orchestrator
        .execute("root", &request(BulkAction::Delete, &[]))
        .await;

    assert!(report.is_success());
    assert_eq!(report.outcome, BatchOutcome::Skipped);
    assert_eq!(orchestrator.provider().mutation_calls(), 0);
    assert!(recorder.recorded().is_empty());
}

#[tokio::test]
async fn test_delete_describes_targets_before_dispatch() {
    let recorder: Arc<RecordingRecorder> = Arc::new(RecordingRecorder::default());
    let orchestrator = BulkOrchestrator::new(create_test_directory(), Arc::clone(&recorder));

    let report: BulkReport = orchestrator
        .execute("root", &request(BulkAction::Delete, &["u1", "u3"]))
        .await;

    assert!(report.is_success());
    assert_eq!(orchestrator.provider().users().len(), 1);
    let recorded: Vec<NewActivity> = recorder.recorded();
    assert_eq!(recorded[0].action, "Deleted multiple users");
    assert_eq!(recorded[0].target.as_deref(), Some("a@x, c@x"));
}

#[tokio::test]
async fn test_role_change_summary_names_role() {
    let recorder: Arc<RecordingRecorder> = Arc::new(RecordingRecorder::default());
    let orchestrator = BulkOrchestrator::new(create_test_directory(), Arc::clone(&recorder));

    orchestrator
        .execute(
            "root",
            &request(BulkAction::ChangeRole { role: Role::Admin }, &["u2"]),
        )
        .await;

    let recorded: Vec<NewActivity> = recorder.recorded();
    assert_eq!(recorded[0].action, "Updated role to admin");
    assert_eq!(recorded[0].activity_type, ActivityType::Edit);
    assert_eq!(
        orchestrator.provider().user(&user_id("u2")).unwrap().role,
        Role::Admin
    );
}

#[tokio::test]
async fn test_recorder_failure_does_not_fail_batch() {
    let orchestrator = BulkOrchestrator::new(create_test_directory(), FailingRecorder);

    let report: BulkReport = orchestrator
        .execute("root", &request(BulkAction::Unban, &["u1"]))
        .await;

    assert!(report.is_success());
    assert_eq!(report.outcome, BatchOutcome::Completed { activity: None });
}

/// Provider whose calls only complete once every target has been dispatched.
struct RendezvousProvider {
    barrier: Arc<Barrier>,
}

impl IdentityProvider for RendezvousProvider {
    fn ban_user(
        &self,
        _id: &UserId,
        _reason: Option<&str>,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        let barrier: Arc<Barrier> = Arc::clone(&self.barrier);
        async move {
            barrier.wait().await;
            Ok(())
        }
    }

    fn unban_user(&self, _id: &UserId) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(Ok(()))
    }

    fn set_role(
        &self,
        _id: &UserId,
        _role: Role,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(Ok(()))
    }

    fn delete_user(&self, _id: &UserId) -> impl Future<Output = Result<(), ProviderError>> + Send {
        ready(Ok(()))
    }

    fn describe_users(
        &self,
        _ids: &[UserId],
    ) -> impl Future<Output = Result<Vec<ManagedUser>, ProviderError>> + Send {
        ready(Err(ProviderError::new("directory offline")))
    }
}

#[tokio::test]
async fn test_targets_are_dispatched_concurrently() {
    let provider: RendezvousProvider = RendezvousProvider {
        barrier: Arc::new(Barrier::new(3)),
    };
    let recorder: Arc<RecordingRecorder> = Arc::new(RecordingRecorder::default());
    let orchestrator = BulkOrchestrator::new(provider, Arc::clone(&recorder));

    let report: BulkReport = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.execute(
            "root",
            &request(BulkAction::Ban { reason: None }, &["u1", "u2", "u3"]),
        ),
    )
    .await
    .expect("sequential dispatch would never pass the barrier");

    assert!(report.is_success());
    // Describe failed, so the target falls back to a count.
    assert_eq!(recorder.recorded()[0].target.as_deref(), Some("3 users"));
}
