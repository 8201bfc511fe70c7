//! Display helpers shared by the views.

use chrono::{DateTime, NaiveDate};

/// "May 1, 2024" for an ISO date or timestamp; "N/A" when missing or unparsable.
pub fn format_date(value: &str) -> String {
    let value = value.trim();
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        // Plain dates, and timestamps without an offset.
        .or_else(|_| {
            let day = value.split('T').next().unwrap_or(value);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
        });

    match date {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => "N/A".to_string(),
    }
}

/// "Tuesday, May 14, 2024", used as the heading of a day's event list.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01"), "May 1, 2024");
        assert_eq!(format_date("2024-01-15T10:00:00+00:00"), "Jan 15, 2024");
        assert_eq!(format_date("2024-12-31T23:59:59.123456"), "Dec 31, 2024");
        assert_eq!(format_date(""), "N/A");
        assert_eq!(format_date("yesterday"), "N/A");
    }

    #[test]
    fn test_format_long_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
        assert_eq!(format_long_date(date), "Tuesday, May 14, 2024");
    }
}
