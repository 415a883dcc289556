//! Small helpers shared by the controller and the driver.
//!
//! - Relative "time ago" labels for article timestamps
//! - String truncation for logging
//! - Search keyword normalisation and the suggestion length threshold

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

/// Label a publication time relative to `now`.
///
/// - under one hour (including timestamps in the future): `"Just now"`
/// - under a day: `"N hours ago"`, floored
/// - otherwise the calendar date as `M/D/YYYY`
///
/// # Examples
///
/// ```ignore
/// let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
/// let then = Utc.with_ymd_and_hms(2025, 5, 6, 9, 30, 0).unwrap();
/// assert_eq!(format_relative_date(&then, &now), "2 hours ago");
/// ```
pub fn format_relative_date<Tz>(published: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let seconds = now.clone().signed_duration_since(published.clone()).num_seconds();
    let hours = seconds as f64 / 3600.0;

    if hours < 1.0 {
        "Just now".to_string()
    } else if hours < 24.0 {
        format!("{} hours ago", hours.floor() as i64)
    } else {
        published.format("%-m/%-d/%Y").to_string()
    }
}

/// [`format_relative_date`] for an RFC 3339 string. Input that does not
/// parse is returned unchanged.
pub fn format_relative_date_str(published: &str, now: &DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(published.trim()) {
        Ok(parsed) => format_relative_date(&parsed.with_timezone(&Utc), now),
        Err(_) => published.to_string(),
    }
}

/// Truncate a string for logging, keeping whole characters.
///
/// Strings longer than `max` characters are cut and suffixed with
/// `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// The trimmed keyword, or `None` when nothing but whitespace was typed.
pub fn normalize_keyword(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether a partially typed keyword is long enough to look up: more than
/// two characters once surrounding whitespace is trimmed.
pub fn is_suggestion_query(typed: &str) -> bool {
    typed.trim().chars().count() > 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_date_just_now() {
        let now = noon();
        assert_eq!(format_relative_date(&(now - Duration::minutes(59)), &now), "Just now");
        assert_eq!(format_relative_date(&(now + Duration::hours(3)), &now), "Just now");
    }

    #[test]
    fn test_relative_date_hours() {
        let now = noon();
        assert_eq!(format_relative_date(&(now - Duration::minutes(60)), &now), "1 hours ago");
        assert_eq!(
            format_relative_date(&(now - Duration::minutes(150)), &now),
            "2 hours ago"
        );
        assert_eq!(
            format_relative_date(&(now - Duration::minutes(23 * 60 + 59)), &now),
            "23 hours ago"
        );
    }

    #[test]
    fn test_relative_date_calendar() {
        let now = noon();
        assert_eq!(format_relative_date(&(now - Duration::days(3)), &now), "5/3/2025");
    }

    #[test]
    fn test_relative_date_str() {
        let now = noon();
        assert_eq!(format_relative_date_str("2025-05-06T10:00:00Z", &now), "2 hours ago");
        assert_eq!(
            format_relative_date_str("2025-05-06T12:30:00+02:00", &now),
            "1 hours ago"
        );
        assert_eq!(format_relative_date_str("yesterday-ish", &now), "yesterday-ish");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with("…(+400 bytes)"));
        // Multi-byte characters are never split.
        assert_eq!(truncate_for_log("ééé", 2), "éé…(+2 bytes)");
    }

    #[test]
    fn test_normalize_keyword() {
        assert_eq!(normalize_keyword("  flood  "), Some("flood"));
        assert_eq!(normalize_keyword(" \t\n"), None);
        assert_eq!(normalize_keyword(""), None);
    }

    #[test]
    fn test_suggestion_query_threshold() {
        assert!(!is_suggestion_query("ab"));
        assert!(!is_suggestion_query("  ab  "));
        assert!(is_suggestion_query("abc"));
        assert!(is_suggestion_query(" bão "));
        // Counted in characters, not bytes.
        assert!(!is_suggestion_query("éé"));
    }
}
