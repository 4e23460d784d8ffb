//! Date helper functions

use chrono::{Datelike, Local, NaiveDate};

/// Shown in place of a date that cannot be parsed
pub const INVALID_DATE: &str = "Invalid Date";

/// Format an ISO calendar date for display
///
/// The date is read as a plain calendar day, so no timezone can shift it.
///
/// # Examples
/// ```ignore
/// format_date("2026-01-01") // -> "Jan 01, 2026"
/// format_date("soon")       // -> "Invalid Date"
/// ```
pub fn format_date(iso: &str) -> String {
    match parse_date(iso) {
        Some(date) => date.format("%b %d, %Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(iso: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d").ok()
}

/// Today's date in ISO form, used for new posts
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Current year for the page footer
pub fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let formatted = format_date("2026-01-01");
        assert_eq!(formatted, "Jan 01, 2026");
        assert!(formatted.contains("2026"));
        assert!(!formatted.contains('-'));
    }

    #[test]
    fn test_format_date_two_digit_day() {
        assert_eq!(format_date("2025-12-07"), "Dec 07, 2025");
    }

    #[test]
    fn test_format_invalid_date() {
        assert_eq!(format_date("2026-13-01"), INVALID_DATE);
        assert_eq!(format_date(""), INVALID_DATE);
        assert_eq!(format_date("yesterday"), INVALID_DATE);
    }

    #[test]
    fn test_today_is_parseable() {
        assert!(parse_date(&today()).is_some());
        assert!(current_year() >= 2024);
    }
}
