//! Client-side form checks, run before any request is issued.

use chrono::NaiveTime;

use crate::error::PortalError;

/// Minimum length for a new password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// True when the field is missing or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_blank_opt(value: Option<&str>) -> bool {
    value.map_or(true, is_blank)
}

/// Fail with `message` if any of the fields is blank.
pub fn require_all(fields: &[&str], message: &str) -> Result<(), PortalError> {
    if fields.iter().any(|f| is_blank(f)) {
        return Err(PortalError::Validation(message.to_string()));
    }
    Ok(())
}

/// Parse an `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// When both times are given, the end must come strictly after the start.
pub fn check_time_range(start: Option<&str>, end: Option<&str>) -> Result<(), PortalError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(());
    };
    if is_blank(start) || is_blank(end) {
        return Ok(());
    }

    let start = parse_time(start)
        .ok_or_else(|| PortalError::Validation("Invalid start_time format. Use HH:MM".to_string()))?;
    let end = parse_time(end)
        .ok_or_else(|| PortalError::Validation("Invalid end_time format. Use HH:MM".to_string()))?;
    if end <= start {
        return Err(PortalError::Validation(
            "End time must be after start time".to_string(),
        ));
    }
    Ok(())
}

/// Lesson order from a form field; blank or unparsable input means 1.
pub fn parse_order(value: &str) -> u32 {
    value.trim().parse::<u32>().ok().filter(|o| *o > 0).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_all() {
        assert!(require_all(&["a", "b"], "msg").is_ok());
        let err = require_all(&["a", "  "], "Please fill in all required fields").unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields");
    }

    #[test]
    fn test_time_range() {
        assert!(check_time_range(Some("09:00"), Some("10:30")).is_ok());
        assert!(check_time_range(Some("09:00:00"), Some("09:00:01")).is_ok());
        assert!(check_time_range(Some("10:00"), Some("09:00")).is_err());
        assert!(check_time_range(Some("10:00"), Some("10:00")).is_err());
        assert!(check_time_range(Some("10:00"), None).is_ok());
        assert!(check_time_range(Some(""), Some("09:00")).is_ok());
        assert!(check_time_range(Some("nine"), Some("10:00")).is_err());
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("3"), 3);
        assert_eq!(parse_order(" 12 "), 12);
        assert_eq!(parse_order(""), 1);
        assert_eq!(parse_order("abc"), 1);
        assert_eq!(parse_order("0"), 1);
    }
}
