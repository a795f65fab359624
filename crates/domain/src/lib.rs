// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod bulk;
mod error;
mod timestamp;
mod types;
mod user;

#[cfg(test)]
mod tests;

pub use bulk::{BulkAction, BulkActionRequest, BulkIntent};
pub use error::DomainError;
pub use timestamp::{format_timestamp, iso8601, now_millis, parse_timestamp, truncate_to_millis};
pub use types::{ActivityType, Role, UserId};
pub use user::{ManagedUser, UserPatch};
