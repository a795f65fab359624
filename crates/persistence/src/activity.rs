// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The admin activity log.
//!
//! Every call reads the backend descriptor in effect at that moment, opens a
//! connection for it, runs exactly one statement and releases the
//! connection. A reconfiguration saved between two calls is therefore picked
//! up by the second call without a restart.
//!
//! Before setup has completed the log is inert: reads return nothing and
//! writes are skipped. Neither touches the configuration file nor opens a
//! connection.

use adminkit::ActivityRecorder;
use adminkit_audit::{ActivityDraft, ActivityEvent, NewActivity};
use adminkit_domain::{format_timestamp, now_millis};
use std::future::{Future, ready};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{BackendDescriptor, ConfigError, DescriptorSource};
use crate::connection::{Connector, SqlConnection, SqlValue};
use crate::data_models::ActivityRow;
use crate::dialect::Statement;
use crate::error::PersistenceError;
use crate::gate::SetupGate;

/// Newest first; ties broken by persistence time.
const SELECT_ACTIVITIES: Statement = Statement::new(
    "SELECT id, action, {user} AS actor, target, type AS activity_type, metadata, \
     timestamp, {createdAt} AS created_at \
     FROM activity \
     ORDER BY timestamp DESC, {createdAt} DESC \
     LIMIT ? OFFSET ?",
);

const INSERT_ACTIVITY: Statement = Statement::new(
    "INSERT INTO activity (id, action, {user}, target, type, metadata, timestamp, {createdAt}) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
);

/// Default page size for [`ActivityLog::list`].
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// A window into the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of events to return.
    pub limit: u32,
    /// Number of newest events to skip.
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Creates a page.
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// The result of [`ActivityLog::append`].
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// The event was written.
    Recorded(ActivityEvent),
    /// Setup is incomplete; nothing was validated or written.
    Skipped,
}

impl AppendOutcome {
    /// Returns the written event, if any.
    #[must_use]
    pub const fn activity(&self) -> Option<&ActivityEvent> {
        match self {
            Self::Recorded(event) => Some(event),
            Self::Skipped => None,
        }
    }
}

/// Reads and writes admin activity through the configured backend.
pub struct ActivityLog<C> {
    source: Arc<dyn DescriptorSource>,
    gate: Arc<SetupGate>,
    connector: C,
}

impl<C: std::fmt::Debug> std::fmt::Debug for ActivityLog<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("gate", &self.gate)
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}

impl<C: Connector> ActivityLog<C> {
    /// Creates an activity log.
    ///
    /// # Arguments
    ///
    /// * `source` - Supplies the backend descriptor on every call
    /// * `gate` - The setup gate; shared with whatever invalidates it
    /// * `connector` - Opens connections for a descriptor
    #[must_use]
    pub fn new(source: Arc<dyn DescriptorSource>, gate: Arc<SetupGate>, connector: C) -> Self {
        Self {
            source,
            gate,
            connector,
        }
    }

    /// Returns the setup gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<SetupGate> {
        &self.gate
    }

    /// Returns the connector.
    #[must_use]
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Forgets everything derived from the previous configuration.
    ///
    /// Call after saving configuration: the gate re-runs its check on the
    /// next call and the connector drops pools built for the old backend.
    pub fn reconfigured(&self) {
        self.gate.invalidate();
        self.connector.reconfigured();
    }

    /// Returns whether setup is complete.
    #[must_use]
    pub fn is_setup_complete(&self) -> bool {
        self.gate.is_open()
    }

    /// Lists activity, newest first.
    ///
    /// Returns an empty list without any I/O while setup is incomplete.
    ///
    /// # Errors
    ///
    /// Returns an error if no database is configured, the connection fails,
    /// or a stored row cannot be decoded.
    pub fn list(&self, page: Page) -> Result<Vec<ActivityEvent>, PersistenceError> {
        if !self.gate.is_open() {
            debug!("Setup incomplete; returning no activity");
            return Ok(Vec::new());
        }

        let rows: Vec<ActivityRow> = self.with_connection(|conn| {
            conn.query(
                &SELECT_ACTIVITIES,
                vec![
                    SqlValue::BigInt(i64::from(page.limit)),
                    SqlValue::BigInt(i64::from(page.offset)),
                ],
            )
        })?;

        rows.into_iter().map(ActivityRow::into_event).collect()
    }

    /// Validates and writes an activity.
    ///
    /// While setup is incomplete this returns [`AppendOutcome::Skipped`]
    /// without validating the draft.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Validation`] before any I/O if a required
    /// field is missing or the type is unknown, or an error if the write
    /// fails.
    pub fn append(&self, draft: ActivityDraft) -> Result<AppendOutcome, PersistenceError> {
        if !self.gate.is_open() {
            debug!("Setup incomplete; activity not recorded");
            return Ok(AppendOutcome::Skipped);
        }

        let activity: NewActivity = draft.validate()?;
        let event: ActivityEvent = self.insert(activity)?;
        Ok(AppendOutcome::Recorded(event))
    }

    /// Writes an already-validated activity.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if setup is incomplete
    /// * `Ok(Some(event))` with the stored event otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn record(&self, activity: NewActivity) -> Result<Option<ActivityEvent>, PersistenceError> {
        if !self.gate.is_open() {
            debug!("Setup incomplete; activity not recorded");
            return Ok(None);
        }
        self.insert(activity).map(Some)
    }

    fn insert(&self, activity: NewActivity) -> Result<ActivityEvent, PersistenceError> {
        let event: ActivityEvent = activity.stamp(now_millis());

        let timestamp: String = format_timestamp(event.timestamp)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        let created: String = format_timestamp(event.created_at)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        let params: Vec<SqlValue> = vec![
            SqlValue::from(event.id.as_str()),
            SqlValue::from(event.action.as_str()),
            SqlValue::from(event.actor.as_str()),
            SqlValue::from(event.target.clone()),
            SqlValue::from(event.activity_type.as_str()),
            SqlValue::from(event.metadata_text()?),
            SqlValue::from(timestamp),
            SqlValue::from(created),
        ];

        self.with_connection(|conn| conn.execute(&INSERT_ACTIVITY, params))?;

        info!(
            id = %event.id,
            activity_type = %event.activity_type,
            actor = %event.actor,
            "Activity recorded"
        );
        Ok(event)
    }

    /// Opens a connection for the current descriptor, runs `op` and
    /// releases the connection whether or not `op` succeeded.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut C::Conn) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let descriptor: BackendDescriptor = self
            .source
            .descriptor()?
            .ok_or(ConfigError::MissingDescriptor)?;
        let mut conn: C::Conn = self.connector.open(&descriptor)?;
        let result: Result<T, PersistenceError> = op(&mut conn);
        let closed: Result<(), PersistenceError> = conn.close();
        let value: T = result?;
        closed?;
        Ok(value)
    }
}

impl<C: Connector> ActivityRecorder for ActivityLog<C> {
    type Error = PersistenceError;

    fn record(
        &self,
        activity: NewActivity,
    ) -> impl Future<Output = Result<Option<ActivityEvent>, Self::Error>> + Send {
        ready(Self::record(self, activity))
    }
}
