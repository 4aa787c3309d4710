//! Cutoff date parsing.
//!
//! Accepted forms:
//!
//! - `2024-01-31`: midnight UTC on that date
//! - `2024-01-31T12:00:00+02:00`: an RFC 3339 timestamp
//! - `90d`, `90 days`, `3m`, `3 months`: relative to now
//!
//! The cutoff is resolved once, before any repository is contacted.

use std::sync::OnceLock;

use chrono::{DateTime, Months, NaiveDate, TimeDelta, Utc};
use regex::Regex;

use crate::error::{Error, Result};

fn relative_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\s*(d|days?|m|months?)$").expect("relative date pattern is valid")
    })
}

/// Resolves a cutoff expression against `now`.
pub fn parse_since(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let since = parse_absolute(input)
        .or_else(|| parse_relative(input, now))
        .ok_or_else(|| {
            Error::config_with_hint(
                format!("Invalid cutoff date '{}'", input),
                "Use YYYY-MM-DD, an RFC 3339 timestamp, or a relative value such as 90d or 3m",
            )
        })?;

    if since > now {
        return Err(Error::config(format!(
            "Cutoff date {} is in the future",
            since.format("%Y-%m-%d")
        )));
    }

    Ok(since)
}

fn parse_absolute(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn parse_relative(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = input.to_lowercase();
    let captures = relative_pattern().captures(&lowered)?;
    let amount: u32 = captures[1].parse().ok()?;
    if captures[2].starts_with('d') {
        now.checked_sub_signed(TimeDelta::try_days(i64::from(amount))?)
    } else {
        now.checked_sub_months(Months::new(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-31T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ymd(input: &str) -> String {
        parse_since(input, now())
            .unwrap()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    }

    #[test]
    fn test_absolute_date_is_midnight_utc() {
        assert_eq!(ymd("2024-01-15"), "2024-01-15T00:00:00");
    }

    #[test]
    fn test_rfc3339_timestamp() {
        assert_eq!(ymd("2024-01-15T10:30:00+02:00"), "2024-01-15T08:30:00");
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(ymd("90d"), "2024-03-02T12:00:00");
        assert_eq!(ymd("1 day"), "2024-05-30T12:00:00");
        assert_eq!(ymd(" 10 Days "), "2024-05-21T12:00:00");
    }

    #[test]
    fn test_relative_months_clamp_to_month_end() {
        assert_eq!(ymd("3m"), "2024-02-29T12:00:00");
        assert_eq!(ymd("1 month"), "2024-04-30T12:00:00");
    }

    #[test]
    fn test_relative_units_are_case_insensitive() {
        assert_eq!(ymd("2 MONTHS"), "2024-03-31T12:00:00");
        assert_eq!(ymd("7D"), "2024-05-24T12:00:00");
    }

    #[test]
    fn test_invalid_input() {
        let err = parse_since("last week", now()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("hint:"));
        assert!(parse_since("2024-13-01", now()).is_err());
        assert!(parse_since("", now()).is_err());
    }

    #[test]
    fn test_future_cutoff_is_rejected() {
        let err = parse_since("2030-01-01", now()).unwrap_err();
        assert!(err.to_string().contains("in the future"));
    }

    #[test]
    fn test_zero_days_is_now() {
        assert_eq!(parse_since("0d", now()).unwrap(), now());
    }
}
