//! Count-window timestamps.
//!
//! Accepted forms:
//! - RFC 3339 with offset (`2024-11-05T19:00:00-05:00`, `...Z`)
//! - naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (a space separator also works),
//!   read as UTC
//! - bare date `YYYY-MM-DD`, read as midnight UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{IoError, IoResult};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into epoch milliseconds.
pub fn parse_timestamp_ms(raw: &str) -> IoResult<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(IoError::Date("empty timestamp".into()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt.and_utc().timestamp_millis());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = d.and_hms_opt(0, 0, 0) {
            return Ok(ndt.and_utc().timestamp_millis());
        }
    }
    Err(IoError::Date(format!("unrecognised timestamp {s:?}")))
}
