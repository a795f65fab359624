// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_audit::{ActivityEvent, NewActivity};
use std::future::Future;
use std::sync::Arc;

/// Sink for validated activities.
///
/// Returns `Ok(None)` when the recorder accepted the call but deliberately
/// wrote nothing, which is what the audit log does before setup completes.
pub trait ActivityRecorder: Send + Sync {
    /// The error raised when the activity could not be written.
    type Error: std::fmt::Display + Send;

    /// Records one activity.
    fn record(
        &self,
        activity: NewActivity,
    ) -> impl Future<Output = Result<Option<ActivityEvent>, Self::Error>> + Send;
}

impl<R: ActivityRecorder> ActivityRecorder for Arc<R> {
    type Error = R::Error;

    fn record(
        &self,
        activity: NewActivity,
    ) -> impl Future<Output = Result<Option<ActivityEvent>, Self::Error>> + Send {
        (**self).record(activity)
    }
}
