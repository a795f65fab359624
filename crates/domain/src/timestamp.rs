// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! ISO-8601 timestamp encoding shared by the wire format and the activity table.
//!
//! Instants are always written in UTC with exactly three fractional digits
//! (`2026-01-05T09:30:00.120Z`). The fixed width keeps lexical ordering of the
//! stored text identical to chronological ordering, which both backends rely
//! on for `ORDER BY timestamp DESC`.
//!
//! Parsing accepts any RFC 3339 instant so rows written by other tools remain
//! readable.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::DomainError;

const ISO_MILLIS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Formats an instant as a fixed-width UTC ISO-8601 string.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented (years outside
/// `0000..=9999`).
pub fn format_timestamp(instant: OffsetDateTime) -> Result<String, DomainError> {
    instant
        .to_offset(UtcOffset::UTC)
        .format(ISO_MILLIS)
        .map_err(|e| DomainError::InvalidTimestamp(e.to_string()))
}

/// Parses an RFC 3339 instant.
///
/// # Errors
///
/// Returns an error if the string is not a valid RFC 3339 instant.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|instant| instant.to_offset(UtcOffset::UTC))
        .map_err(|e| DomainError::InvalidTimestamp(format!("{value}: {e}")))
}

/// Drops sub-millisecond precision so an instant survives a round trip
/// through its stored text form unchanged.
#[must_use]
pub fn truncate_to_millis(instant: OffsetDateTime) -> OffsetDateTime {
    let nanos: u32 = instant.nanosecond() / 1_000_000 * 1_000_000;
    instant.replace_nanosecond(nanos).unwrap_or(instant)
}

/// Returns the current instant truncated to millisecond precision.
#[must_use]
pub fn now_millis() -> OffsetDateTime {
    truncate_to_millis(OffsetDateTime::now_utc())
}

/// Serde adapter for `OffsetDateTime` fields using the fixed ISO-8601 form.
///
/// Use with `#[serde(with = "adminkit_domain::iso8601")]`.
pub mod iso8601 {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};
    use time::OffsetDateTime;

    /// Serializes an instant as fixed-width ISO-8601.
    ///
    /// # Errors
    ///
    /// Returns a serializer error if the instant cannot be formatted.
    pub fn serialize<S: Serializer>(
        instant: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text: String = super::format_timestamp(*instant).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Deserializes an RFC 3339 instant.
    ///
    /// # Errors
    ///
    /// Returns a deserializer error if the value is not a valid instant.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text: String = String::deserialize(deserializer)?;
        super::parse_timestamp(&text).map_err(de::Error::custom)
    }
}
