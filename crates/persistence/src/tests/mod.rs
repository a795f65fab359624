// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod backend_validation_tests;
mod dialect_tests;
mod gate_tests;

use adminkit_audit::ActivityDraft;
use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::sqlite::Sqlite;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::{
    ActivityLog, AppConfig, BackendDescriptor, ConfigError, ConfigStore, Connector,
    DatabaseConnection, DatabaseConnector, DescriptorSource, Dialect, PersistenceError,
    SetupCheck, SetupGate, SqlConnection, SqlValue, Statement, check_arity,
};

/// A setup check with a fixed answer that counts how often it runs.
#[derive(Debug, Default)]
pub struct FixedCheck {
    pub complete: bool,
    pub calls: AtomicUsize,
}

impl FixedCheck {
    pub fn new(complete: bool) -> Self {
        Self {
            complete,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SetupCheck for FixedCheck {
    fn is_setup_complete(&self) -> Result<bool, ConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.complete)
    }
}

/// A setup check that always fails.
#[derive(Debug)]
pub struct BrokenCheck;

impl SetupCheck for BrokenCheck {
    fn is_setup_complete(&self) -> Result<bool, ConfigError> {
        Err(ConfigError::Malformed {
            path: "config.json".into(),
            message: String::from("expected value at line 1 column 1"),
        })
    }
}

/// A descriptor source whose descriptor can be swapped between calls.
#[derive(Debug, Default)]
pub struct SwitchableSource {
    pub descriptor: Mutex<Option<BackendDescriptor>>,
    pub reads: AtomicUsize,
}

impl SwitchableSource {
    pub fn new(descriptor: Option<BackendDescriptor>) -> Self {
        Self {
            descriptor: Mutex::new(descriptor),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, descriptor: BackendDescriptor) {
        *self.descriptor.lock().unwrap() = Some(descriptor);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DescriptorSource for SwitchableSource {
    fn descriptor(&self) -> Result<Option<BackendDescriptor>, ConfigError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.descriptor.lock().unwrap().clone())
    }
}

/// Wraps the production connector and counts connections opened.
#[derive(Debug, Default)]
pub struct CountingConnector {
    pub inner: DatabaseConnector,
    pub opened: AtomicUsize,
    pub reconfigured: AtomicUsize,
}

impl CountingConnector {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn reconfigure_calls(&self) -> usize {
        self.reconfigured.load(Ordering::SeqCst)
    }
}

impl Connector for CountingConnector {
    type Conn = DatabaseConnection;

    fn open(&self, descriptor: &BackendDescriptor) -> Result<DatabaseConnection, PersistenceError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.inner.open(descriptor)
    }

    fn reconfigured(&self) {
        self.reconfigured.fetch_add(1, Ordering::SeqCst);
        self.inner.reconfigured();
    }
}

/// A connector whose connections record rendered SQL instead of running it.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    pub rendered: Arc<Mutex<Vec<(Dialect, String)>>>,
    pub closed: Arc<AtomicUsize>,
}

impl RecordingConnector {
    pub fn rendered(&self) -> Vec<(Dialect, String)> {
        self.rendered.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct RecordingConnection {
    dialect: Dialect,
    rendered: Arc<Mutex<Vec<(Dialect, String)>>>,
    closed: Arc<AtomicUsize>,
}

impl SqlConnection for RecordingConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
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
        self.rendered
            .lock()
            .unwrap()
            .push((self.dialect, statement.render(self.dialect)));
        Ok(Vec::new())
    }

    fn execute(
        &mut self,
        statement: &Statement,
        params: Vec<SqlValue>,
    ) -> Result<usize, PersistenceError> {
        check_arity(statement, &params)?;
        self.rendered
            .lock()
            .unwrap()
            .push((self.dialect, statement.render(self.dialect)));
        Ok(1)
    }

    fn close(self) -> Result<(), PersistenceError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Connector for RecordingConnector {
    type Conn = RecordingConnection;

    fn open(&self, descriptor: &BackendDescriptor) -> Result<RecordingConnection, PersistenceError> {
        descriptor.validate()?;
        Ok(RecordingConnection {
            dialect: Dialect::for_kind(descriptor.kind()),
            rendered: Arc::clone(&self.rendered),
            closed: Arc::clone(&self.closed),
        })
    }
}

pub fn embedded_descriptor(dir: &Path) -> BackendDescriptor {
    BackendDescriptor::Embedded {
        path: dir.join("app.db"),
    }
}

pub fn client_server_descriptor() -> BackendDescriptor {
    BackendDescriptor::ClientServer {
        host: String::from("db.internal"),
        port: 5432,
        database: String::from("adminkit"),
        username: String::from("admin"),
        password: String::from("secret"),
        schema: None,
        ssl: false,
    }
}

/// A descriptor pointing at a port nothing listens on.
pub fn unreachable_descriptor() -> BackendDescriptor {
    BackendDescriptor::ClientServer {
        host: String::from("127.0.0.1"),
        port: 1,
        database: String::from("adminkit"),
        username: String::from("admin"),
        password: String::new(),
        schema: None,
        ssl: false,
    }
}

/// Writes a completed configuration for an embedded database in `dir`.
pub fn create_completed_store(dir: &TempDir) -> ConfigStore {
    let store: ConfigStore = ConfigStore::new(dir.path().join("config.json"));
    store
        .save(&AppConfig {
            setup_complete: true,
            database_config: Some(embedded_descriptor(dir.path())),
        })
        .unwrap();
    store
}

/// Creates an activity log over a completed embedded configuration.
pub fn create_test_log(dir: &TempDir) -> ActivityLog<CountingConnector> {
    let store: Arc<ConfigStore> = Arc::new(create_completed_store(dir));
    let gate: Arc<SetupGate> = Arc::new(SetupGate::new(store.clone()));
    ActivityLog::new(store, gate, CountingConnector::default())
}

pub fn create_test_draft(action: &str, activity_type: &str) -> ActivityDraft {
    ActivityDraft {
        action: Some(String::from(action)),
        user: Some(String::from("Alice Admin")),
        target: Some(String::from("bob@example.com")),
        activity_type: Some(String::from(activity_type)),
        ..ActivityDraft::default()
    }
}
