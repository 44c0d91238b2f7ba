//! Timestamp Helpers
//!
//! All stored timestamps are RFC 3339 UTC strings with millisecond precision,
//! e.g. `2024-05-01T12:00:00.000Z`.

use chrono::{DateTime, SecondsFormat, Utc};
use prompt_stash_core::{CoreError, CoreResult};

/// Format a UTC instant the way records store it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as a record timestamp.
pub fn now_iso() -> String {
    format_timestamp(Utc::now())
}

/// Parse a stored timestamp.
pub fn parse_timestamp(value: &str) -> CoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::validation(format!("invalid timestamp '{}': {}", value, e)))
}
