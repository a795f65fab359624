// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit::ActivityRecorder;
use adminkit_audit::{ActivityEvent, NewActivity};
use adminkit_persistence::{Persistence, PersistenceError};
use std::future::Future;
use std::sync::Arc;
use tracing::error;

/// Records bulk activities on the blocking pool.
///
/// The activity log talks to diesel synchronously, which must not happen on
/// a runtime worker thread.
#[derive(Debug, Clone)]
pub struct BlockingRecorder {
    log: Arc<Persistence>,
}

impl BlockingRecorder {
    #[must_use]
    pub const fn new(log: Arc<Persistence>) -> Self {
        Self { log }
    }
}

impl ActivityRecorder for BlockingRecorder {
    type Error = PersistenceError;

    fn record(
        &self,
        activity: NewActivity,
    ) -> impl Future<Output = Result<Option<ActivityEvent>, Self::Error>> + Send {
        let log: Arc<Persistence> = Arc::clone(&self.log);
        async move {
            tokio::task::spawn_blocking(move || Persistence::record(&log, activity))
                .await
                .map_err(|e| {
                    error!(error = %e, "Activity recorder task failed");
                    PersistenceError::QueryFailed(format!("recorder task failed: {e}"))
                })?
        }
    }
}
