//! Recency filtering on raw, source-defined timestamps.
//!
//! Listing cards and storage both ask the same question ("is this younger
//! than N whole days?") with different windows, so there is exactly one
//! parser and one comparison here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Naive date-time layouts, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y %H:%M",
    "%b %d, %Y, %I:%M %p",
];

/// Date-only layouts, read as midnight UTC.
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%m/%d/%Y"];

/// Parse a timestamp the way listing pages tend to publish them.
///
/// Accepts RFC 3339, RFC 2822, a handful of naive layouts and Unix epochs in
/// seconds or milliseconds. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(dt) = parse_epoch(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

// Short digit runs are years or ids, not epochs.
fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    if s.len() < 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = s.parse().ok()?;
    if s.len() >= 13 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

/// Whether `timestamp` is at most `max_days_ago` whole days before `now`.
///
/// Future timestamps count as recent. Unparseable or empty input is never
/// recent.
pub fn is_recent_at(timestamp: &str, max_days_ago: u32, now: DateTime<Utc>) -> bool {
    let Some(parsed) = parse_timestamp(timestamp) else {
        return false;
    };
    let days = (now - parsed).num_seconds().div_euclid(SECONDS_PER_DAY);
    days <= i64::from(max_days_ago)
}

/// [`is_recent_at`] against the current time.
pub fn is_recent(timestamp: &str, max_days_ago: u32) -> bool {
    is_recent_at(timestamp, max_days_ago, Utc::now())
}

/// Calendar date (`YYYY-MM-DD`, UTC) of a timestamp, or today when it does
/// not parse.
pub fn publish_date(timestamp: &str) -> String {
    parse_timestamp(timestamp)
        .unwrap_or_else(Utc::now)
        .date_naive()
        .format("%Y-%m-%d")
        .to_string()
}
