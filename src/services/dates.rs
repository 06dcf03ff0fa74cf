use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::AppError;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a calendar date and normalize it to 23:59:59 UTC on that day.
///
/// Accepts `YYYY-MM-DD`, or an ISO-8601 date-time whose date part is kept.
/// `field` names the input in the error message ("expiration date", ...).
pub fn parse_calendar_date(value: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    let date = parse_date_part(value).ok_or_else(|| {
        tracing::debug!("date parsing failed for {field}: {value:?}");
        AppError::invalid_input(format!("Invalid {field} format. Use YYYY-MM-DD"))
    })?;
    Ok(end_of_day(date))
}

pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    date.and_time(last_second).and_utc()
}

fn parse_date_part(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_plain_date_is_end_of_day() {
        let dt = parse_calendar_date("2099-01-01", "expiration date").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2099, 1, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_datetime_keeps_only_the_date() {
        let dt = parse_calendar_date("2099-03-15T08:30:00", "start date").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2099, 3, 15, 23, 59, 59).unwrap());

        let dt = parse_calendar_date("2099-03-15T08:30:00+02:00", "start date").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2099, 3, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert!(parse_calendar_date(" 2099-01-01 ", "expiration date").is_ok());
    }

    #[test]
    fn test_invalid_formats() {
        for bad in ["", "tomorrow", "01/02/2099", "2099-13-01", "2099-02-30"] {
            let err = parse_calendar_date(bad, "expiration date").unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "{bad:?} should be rejected");
            assert_eq!(err.to_string(), "Invalid expiration date format. Use YYYY-MM-DD");
        }
    }

    #[test]
    fn test_today_is_still_in_the_future() {
        let today = Utc::now().date_naive();
        assert!(end_of_day(today) >= Utc::now());
    }
}
