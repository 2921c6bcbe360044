use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::booking::{BookingError, BookingKind};

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})(?::\d{2})?\s*$").expect("regex compiles"));

pub const MAX_COURSE_PERSONS: u32 = 20;
pub const MAX_TUTOR_PERSONS: u32 = 5;
pub const MAX_TUTOR_HOURS: u32 = 40;

/// `HH:MM`, with optional seconds. Anything else is treated as not filled in.
pub fn parse_start_time(raw: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(raw)?;
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// `YYYY-MM-DD`; a trailing `THH:MM:SS` as sent by slot pickers is ignored.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn validate_persons(kind: BookingKind, value: u32) -> Result<u32, BookingError> {
    let max = match kind {
        BookingKind::Course => MAX_COURSE_PERSONS,
        BookingKind::Tutor => MAX_TUTOR_PERSONS,
    };
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(BookingError::Invalid(format!(
            "number of students must be between 1 and {max}"
        )))
    }
}

pub fn validate_duration(value: u32) -> Result<u32, BookingError> {
    if (1..=MAX_TUTOR_HOURS).contains(&value) {
        Ok(value)
    } else {
        Err(BookingError::Invalid(format!(
            "duration must be between 1 and {MAX_TUTOR_HOURS} hours"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_persons() {
        assert!(validate_persons(BookingKind::Course, 1).is_ok());
        assert!(validate_persons(BookingKind::Course, 20).is_ok());
        assert!(validate_persons(BookingKind::Course, 0).is_err());
        assert!(validate_persons(BookingKind::Course, 21).is_err());
        assert!(validate_persons(BookingKind::Tutor, 5).is_ok());
        assert!(validate_persons(BookingKind::Tutor, 6).is_err());
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(40).is_ok());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(41).is_err());
    }

    #[test]
    fn test_parse_start_time() {
        assert_eq!(parse_start_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_start_time("9:05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_start_time("18:00:00"), NaiveTime::from_hms_opt(18, 0, 0));
        assert!(parse_start_time("").is_none());
        assert!(parse_start_time("25:00").is_none());
        assert!(parse_start_time("noon").is_none());
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(parse_start_date("2025-03-01"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(
            parse_start_date("2025-03-01T09:00:00"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert!(parse_start_date("01.03.2025").is_none());
        assert!(parse_start_date("").is_none());
    }
}
