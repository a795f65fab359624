// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;

use crate::{format_timestamp, parse_timestamp, truncate_to_millis};

#[test]
fn test_format_is_fixed_width_utc() {
    let instant: OffsetDateTime = datetime!(2026-01-05 09:30:00.12 +02:00);
    assert_eq!(
        format_timestamp(instant).unwrap(),
        "2026-01-05T07:30:00.120Z"
    );
}

#[test]
fn test_parse_accepts_offsets_and_normalizes_to_utc() {
    let parsed: OffsetDateTime = parse_timestamp("2026-01-05T09:30:00+01:00").unwrap();
    assert_eq!(parsed, datetime!(2026-01-05 08:30:00 UTC));
    assert!(parse_timestamp("yesterday").is_err());
}

#[test]
fn test_truncate_round_trips_through_text() {
    let instant: OffsetDateTime = datetime!(2026-03-01 12:00:00.123456789 UTC);
    let truncated: OffsetDateTime = truncate_to_millis(instant);
    let text: String = format_timestamp(truncated).unwrap();
    assert_eq!(text, "2026-03-01T12:00:00.123Z");
    assert_eq!(parse_timestamp(&text).unwrap(), truncated);
}

#[test]
fn test_text_order_matches_chronological_order() {
    let earlier: String = format_timestamp(datetime!(2026-01-01 09:00:00.5 UTC)).unwrap();
    let later: String = format_timestamp(datetime!(2026-01-01 10:00:00 UTC)).unwrap();
    assert!(earlier < later);
}
