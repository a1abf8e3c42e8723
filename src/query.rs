//! Search query construction.
//!
//! A query is the optional keyword, the star qualifier and, when the previous
//! snapshot left a readable checkpoint, a `pushed:>` lower bound.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Format GitHub's search qualifiers accept for date-times.
const SEARCH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a checkpoint written by a previous run.
///
/// Accepts RFC 3339 (`Z` or a numeric offset) and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, which is read as UTC.
pub fn parse_checkpoint(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render an instant the way the `pushed:` qualifier expects it.
pub fn format_search_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(SEARCH_TIMESTAMP_FORMAT).to_string()
}

/// Build the query from already-parsed parts.
pub fn build_query(keyword: &str, min_stars: u32, pushed_after: Option<DateTime<Utc>>) -> String {
    let mut parts = Vec::with_capacity(3);
    let keyword = keyword.trim();
    if !keyword.is_empty() {
        parts.push(keyword.to_string());
    }
    parts.push(format!("stars:>={}", min_stars));
    if let Some(instant) = pushed_after {
        parts.push(format!("pushed:>{}", format_search_timestamp(instant)));
    }
    parts.join(" ")
}

/// Build the search query for this run.
///
/// An unparsable `previous_last_updated` drops the `pushed:>` clause and the
/// run falls back to a full query.
pub fn compute_query(keyword: &str, min_stars: u32, previous_last_updated: Option<&str>) -> String {
    build_query(
        keyword,
        min_stars,
        previous_last_updated.and_then(parse_checkpoint),
    )
}
