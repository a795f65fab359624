// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use adminkit::{BulkOrchestrator, MemoryDirectory};
use adminkit_domain::{ManagedUser, Role, UserId};
use adminkit_persistence::{
    ActivityLog, AppConfig, BackendDescriptor, ConfigStore, DatabaseConnector, SetupGate,
};
use std::sync::Arc;
use tempfile::TempDir;
use time::macros::datetime;

use crate::AuthenticatedActor;

pub type TestLog = ActivityLog<DatabaseConnector>;
pub type TestOrchestrator = BulkOrchestrator<MemoryDirectory, Arc<TestLog>>;

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new("admin-123", "Alice Admin", Role::Admin)
}

pub fn create_test_member() -> AuthenticatedActor {
    AuthenticatedActor::new("user-456", "Bob Member", Role::User)
}

fn create_log(store: ConfigStore) -> TestLog {
    let store: Arc<ConfigStore> = Arc::new(store);
    let gate: Arc<SetupGate> = Arc::new(SetupGate::new(store.clone()));
    ActivityLog::new(store, gate, DatabaseConnector::new())
}

/// An activity log whose setup has completed, backed by `SQLite` in `dir`.
pub fn create_open_log(dir: &TempDir) -> TestLog {
    let store = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&AppConfig {
            setup_complete: true,
            database_config: Some(BackendDescriptor::Embedded {
                path: dir.path().join("app.db"),
            }),
        })
        .unwrap();
    create_log(store)
}

/// An activity log before setup: there is no configuration file at all.
pub fn create_closed_log(dir: &TempDir) -> TestLog {
    create_log(ConfigStore::new(dir.path().join("config.json")))
}

pub fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap()
}

pub fn create_test_directory() -> MemoryDirectory {
    let user = |id: &str, email: &str| {
        ManagedUser::new(
            user_id(id),
            String::from(email),
            String::from(id),
            datetime!(2026-01-01 00:00:00 UTC),
        )
    };
    MemoryDirectory::with_users(vec![user("u1", "a@x"), user("u2", "b@x"), user("u3", "c@x")])
}

pub fn create_test_orchestrator(log: TestLog) -> (TestOrchestrator, Arc<TestLog>) {
    let log: Arc<TestLog> = Arc::new(log);
    (
        BulkOrchestrator::new(create_test_directory(), Arc::clone(&log)),
        log,
    )
}

pub fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
