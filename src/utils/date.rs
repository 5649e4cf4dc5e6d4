//! Date parsing helpers for posting publication dates.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Parse a published date trying common formats in order.
///
/// Returns `None` when no format matches; recency filtering treats that as
/// "keep" rather than dropping the posting.
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }

    // ISO strings with zone suffixes: retry on the date part alone.
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    if date_part != trimmed {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }

    log::debug!("Could not parse date: {trimmed}");
    None
}

/// Reduce an ISO timestamp to its `YYYY-MM-DD` date part.
pub fn date_only(raw: &str) -> String {
    raw.trim().split('T').next().unwrap_or("").to_string()
}

/// Convert an epoch-millisecond timestamp to `YYYY-MM-DD`, empty on failure.
pub fn timestamp_millis_to_date(millis: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(millis) {
        Some(datetime) => datetime.date_naive().format("%Y-%m-%d").to_string(),
        None => {
            log::debug!("Could not convert timestamp: {millis}");
            String::new()
        }
    }
}

/// Whether a posting dated `raw` falls within `max_age_days` of `now`.
///
/// Missing or unparseable dates fail open: the posting counts as recent.
pub fn is_recent(raw: &str, now: NaiveDate, max_age_days: i64) -> bool {
    match parse_published_date(raw) {
        Some(date) => date >= now - Duration::days(max_age_days),
        None => true,
    }
}
