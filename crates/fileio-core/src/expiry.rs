//! Expiry duration parsing
//!
//! The service reports retention as a duration string, either compact
//! (`"1w"`) or spaced (`"14 days"`). `expiry_deadline` converts such a
//! string into an absolute timestamp relative to a reference instant.
//! Days and weeks are fixed-length; months and years follow calendar
//! arithmetic, so `Jan 31 + 1 month` clamps to the end of February.

use chrono::{DateTime, Duration, Months, Utc};

use crate::error::{ClientError, ClientResult};

/// Compute the absolute deadline `from + duration(raw)`.
///
/// Unknown units, malformed counts, and out-of-range results all surface
/// as `UnsupportedDurationUnit` carrying the raw input.
pub fn expiry_deadline(raw: &str, from: DateTime<Utc>) -> ClientResult<DateTime<Utc>> {
    let unsupported = || ClientError::UnsupportedDurationUnit(raw.to_string());

    let trimmed = raw.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(unsupported)?;
    let (count, unit) = trimmed.split_at(digits_end);
    let count: u32 = count.parse().map_err(|_| unsupported())?;
    let unit = unit.trim().to_ascii_lowercase();

    let deadline = match unit.as_str() {
        "d" | "day" | "days" => from.checked_add_signed(Duration::days(i64::from(count))),
        "w" | "week" | "weeks" => from.checked_add_signed(Duration::weeks(i64::from(count))),
        "m" | "month" | "months" => from.checked_add_months(Months::new(count)),
        "y" | "year" | "years" => count
            .checked_mul(12)
            .and_then(|months| from.checked_add_months(Months::new(months))),
        _ => return Err(unsupported()),
    };

    deadline.ok_or_else(unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_compact_week() {
        let deadline = expiry_deadline("1w", reference()).unwrap();
        assert_eq!(deadline, reference() + Duration::weeks(1));
    }

    #[test]
    fn test_spaced_days() {
        let deadline = expiry_deadline("14 days", reference()).unwrap();
        assert_eq!(deadline, reference() + Duration::days(14));
    }

    #[test]
    fn test_singular_unit() {
        let deadline = expiry_deadline("1 day", reference()).unwrap();
        assert_eq!(deadline, reference() + Duration::days(1));
    }

    #[test]
    fn test_months_are_calendar_aware() {
        let from = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let deadline = expiry_deadline("1m", from).unwrap();
        // 2024 is a leap year; Jan 31 + 1 month clamps to Feb 29.
        assert_eq!(deadline, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_years_preserve_day_and_time() {
        let deadline = expiry_deadline("2 years", reference()).unwrap();
        assert_eq!(
            deadline,
            Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_case_insensitive_unit() {
        let deadline = expiry_deadline("3 Days", reference()).unwrap();
        assert_eq!(deadline, reference() + Duration::days(3));
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let err = expiry_deadline("5 fortnights", reference()).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_DURATION_UNIT");
        assert!(err.to_string().contains("fortnights"));
    }

    #[test]
    fn test_missing_unit_rejected() {
        let err = expiry_deadline("42", reference()).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_DURATION_UNIT");
    }

    #[test]
    fn test_missing_count_rejected() {
        let err = expiry_deadline("days", reference()).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_DURATION_UNIT");
    }

    #[test]
    fn test_empty_string_rejected() {
        assert!(expiry_deadline("", reference()).is_err());
        assert!(expiry_deadline("   ", reference()).is_err());
    }
}
