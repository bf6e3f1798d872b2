//! Common validation utilities.

use chrono::{DateTime, NaiveDate, Utc};
use validator::ValidationError;

/// Longest description accepted on any free-text field.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Validates that a work interval's end, when present, lies strictly after
/// its start. An open interval (no end yet) is always valid.
pub fn validate_interval_bounds(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match end {
        Some(end) if end <= start => {
            let mut err = ValidationError::new("interval_bounds");
            err.message = Some("Interval end must be after its start".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Validates that a report period is well-formed (end not before start).
/// Malformed periods are rejected, never clamped.
pub fn validate_period(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if end < start {
        let mut err = ValidationError::new("period_bounds");
        err.message = Some("Period end must not precede its start".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a leave date range: the end date must lie strictly after the
/// start date.
pub fn validate_leave_dates(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end <= start {
        let mut err = ValidationError::new("leave_dates");
        err.message = Some("Leave end date must be after its start date".into());
        return Err(err);
    }
    Ok(())
}

/// Validates free-text description length.
pub fn validate_description(text: &str) -> Result<(), ValidationError> {
    if text.len() > MAX_DESCRIPTION_LENGTH {
        let mut err = ValidationError::new("description_length");
        err.message = Some("Description is too long".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    // Interval bound tests
    #[test]
    fn test_validate_interval_bounds_ok() {
        assert!(validate_interval_bounds(ts(8, 0), Some(ts(16, 0))).is_ok());
    }

    #[test]
    fn test_validate_interval_bounds_open_interval() {
        assert!(validate_interval_bounds(ts(8, 0), None).is_ok());
    }

    #[test]
    fn test_validate_interval_bounds_end_before_start() {
        assert!(validate_interval_bounds(ts(16, 0), Some(ts(8, 0))).is_err());
    }

    #[test]
    fn test_validate_interval_bounds_zero_length() {
        assert!(validate_interval_bounds(ts(8, 0), Some(ts(8, 0))).is_err());
    }

    #[test]
    fn test_validate_interval_bounds_error_message() {
        let err = validate_interval_bounds(ts(16, 0), Some(ts(8, 0))).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Interval end must be after its start"
        );
    }

    // Period tests
    #[test]
    fn test_validate_period_ok() {
        assert!(validate_period(ts(0, 0), ts(23, 59)).is_ok());
    }

    #[test]
    fn test_validate_period_instantaneous() {
        // A zero-length period is degenerate but not malformed
        assert!(validate_period(ts(12, 0), ts(12, 0)).is_ok());
    }

    #[test]
    fn test_validate_period_end_before_start() {
        let err = validate_period(ts(23, 0), ts(1, 0)).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Period end must not precede its start"
        );
    }

    // Leave date tests
    #[test]
    fn test_validate_leave_dates_ok() {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
        assert!(validate_leave_dates(start, end).is_ok());
    }

    #[test]
    fn test_validate_leave_dates_same_day() {
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert!(validate_leave_dates(day, day).is_err());
    }

    #[test]
    fn test_validate_leave_dates_reversed() {
        let start = NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert!(validate_leave_dates(start, end).is_err());
    }

    // Description tests
    #[test]
    fn test_validate_description_ok() {
        assert!(validate_description("Worked on quarterly report").is_ok());
    }

    #[test]
    fn test_validate_description_too_long() {
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_description(&long).is_err());
    }

    #[test]
    fn test_validate_description_at_limit() {
        let at_limit = "x".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(validate_description(&at_limit).is_ok());
    }
}
