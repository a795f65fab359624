// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 7;

/// Generates an activity id of the form `{unix_millis}-{7 base36 chars}`.
///
/// The millisecond prefix makes ids roughly sortable by creation time; the
/// random suffix separates events written within the same millisecond.
#[must_use]
pub fn generate_activity_id(created_at: OffsetDateTime) -> String {
    let millis: i128 = created_at.unix_timestamp_nanos() / 1_000_000;
    let mut entropy: u64 = rand::random::<u64>();
    let mut suffix: String = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        // entropy % 36 is always a valid index
        let digit: usize = usize::try_from(entropy % 36).unwrap_or_default();
        suffix.push(char::from(BASE36[digit]));
        entropy /= 36;
    }
    format!("{millis}-{suffix}")
}
