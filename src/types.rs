//! Core types and constants

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{Result, RollCalendarError};

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Price type (NaN marks a missing observation)
pub type Price = f64;

/// Date format used in roll calendar and price files
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Same as [`DATETIME_FORMAT`] with fractional seconds
pub const DATETIME_FRACTION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Midnight UTC on the given date
pub fn timestamp_from_date(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Parse a timestamp written either as `%Y-%m-%d %H:%M:%S` or as a bare date
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    let s = s.trim();
    for format in [DATETIME_FORMAT, DATETIME_FRACTION_FORMAT] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(timestamp_from_date)
        .map_err(|e| RollCalendarError::ParseError(format!("Invalid timestamp '{}': {}", s, e)))
}

/// Format a timestamp the way calendar files store it, keeping any fraction of a second
pub fn format_timestamp(ts: &Timestamp) -> String {
    if ts.timestamp_subsec_nanos() == 0 {
        ts.format(DATETIME_FORMAT).to_string()
    } else {
        ts.format(DATETIME_FRACTION_FORMAT).to_string()
    }
}

/// Whole calendar days between two timestamps, floored like a signed timedelta
pub fn calendar_days_between(later: Timestamp, earlier: Timestamp) -> i64 {
    (later - earlier).num_seconds().div_euclid(86_400)
}
