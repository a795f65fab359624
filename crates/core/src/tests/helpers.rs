// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use adminkit_audit::{ActivityEvent, NewActivity};
use adminkit_domain::{ManagedUser, UserId, now_millis};
use std::future::{Future, ready};
use std::sync::Mutex;
use time::macros::datetime;

use crate::{ActivityRecorder, MemoryDirectory};

pub fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap()
}

pub fn create_test_user(id: &str, email: &str) -> ManagedUser {
    ManagedUser::new(
        user_id(id),
        String::from(email),
        String::from(id),
        datetime!(2026-01-01 00:00:00 UTC),
    )
}

pub fn create_test_users() -> Vec<ManagedUser> {
    vec![
        create_test_user("u1", "a@x"),
        create_test_user("u2", "b@x"),
        create_test_user("u3", "c@x"),
    ]
}

pub fn create_test_directory() -> MemoryDirectory {
    MemoryDirectory::with_users(create_test_users())
}

/// Records every activity in memory.
#[derive(Debug, Default)]
pub struct RecordingRecorder {
    pub recorded: Mutex<Vec<NewActivity>>,
}

impl RecordingRecorder {
    pub fn recorded(&self) -> Vec<NewActivity> {
        self.recorded.lock().unwrap().clone()
    }
}

impl ActivityRecorder for RecordingRecorder {
    type Error = String;

    fn record(
        &self,
        activity: NewActivity,
    ) -> impl Future<Output = Result<Option<ActivityEvent>, Self::Error>> + Send {
        self.recorded.lock().unwrap().push(activity.clone());
        ready(Ok(Some(activity.stamp(now_millis()))))
    }
}

/// Fails every write.
#[derive(Debug, Default)]
pub struct FailingRecorder;

impl ActivityRecorder for FailingRecorder {
    type Error = String;

    fn record(
        &self,
        _activity: NewActivity,
    ) -> impl Future<Output = Result<Option<ActivityEvent>, Self::Error>> + Send {
        ready(Err(String::from("disk full")))
    }
}
