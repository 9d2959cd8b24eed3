//! Core Data timestamp conversion.
//!
//! Both library databases store dates as seconds since the Apple epoch
//! (2001-01-01 00:00:00 UTC) in REAL columns. Absent or out-of-range
//! values format as "unknown date" rather than failing a whole listing.

use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the Unix epoch and 2001-01-01 00:00:00 UTC.
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// Convert a Core Data timestamp to UTC, if representable.
pub fn apple_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let unix = seconds + APPLE_EPOCH_OFFSET as f64;
    Utc.timestamp_opt(unix as i64, 0).single()
}

/// Human-readable date for listings; lenient about missing values.
pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown date".to_string(),
    }
}
