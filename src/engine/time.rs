//! Wall-clock arithmetic used by the derivation engine. Everything here is
//! pure; instants cross from UTC into company-local time exactly once, via
//! [`to_company_local`].

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::ApiError;

/// Parses "H:MM" / "HH:MM" into a time of day. Seconds are not accepted.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| ApiError::invalid(format!("invalid time of day: {:?}, expected HH:MM", s)))
}

/// Combines a calendar date with a time of day, zero seconds.
pub fn at_time_of_day(date: NaiveDate, tod: NaiveTime) -> NaiveDateTime {
    date.and_time(tod)
}

/// Whole minutes from `a` to `b`, floored, clamped at zero. A check-out
/// before check-in yields 0, not an error.
pub fn minutes_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (b - a).num_minutes().max(0)
}

/// Minutes as decimal hours, rounded half-away-from-zero to 2 places.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    round2(minutes as f64 / 60.0)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// The timezone boundary: shifts a UTC instant into the company's wall
/// clock. `tz_offset_minutes` comes from the company record (e.g. +330 for
/// UTC+5:30).
pub fn to_company_local(utc: DateTime<Utc>, tz_offset_minutes: i32) -> NaiveDateTime {
    utc.naive_utc() + Duration::minutes(tz_offset_minutes as i64)
}

/// Inverse of [`to_company_local`], for persisting wall-clock instants back
/// as UTC.
pub fn to_utc(local: NaiveDateTime, tz_offset_minutes: i32) -> NaiveDateTime {
    local - Duration::minutes(tz_offset_minutes as i64)
}

/// Today's calendar date on the company's wall clock.
pub fn today_in_company(now: DateTime<Utc>, tz_offset_minutes: i32) -> NaiveDate {
    to_company_local(now, tz_offset_minutes).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_padded_and_unpadded_times() {
        assert_eq!(
            parse_time_of_day("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("9:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("10:61").is_err());
        assert!(parse_time_of_day("10:30:15").is_err());
        assert!(parse_time_of_day("half past ten").is_err());
        assert!(parse_time_of_day("").is_err());
    }

    #[test]
    fn minutes_between_floors_and_clamps() {
        let a = d(2025, 3, 3).and_hms_opt(10, 0, 0).unwrap();
        let b = d(2025, 3, 3).and_hms_opt(18, 30, 59).unwrap();
        assert_eq!(minutes_between(a, b), 510);
        // reversed order clamps to zero
        assert_eq!(minutes_between(b, a), 0);
        assert_eq!(minutes_between(a, a), 0);
    }

    #[test]
    fn minutes_to_hours_rounds_to_two_places() {
        assert_eq!(minutes_to_hours(480), 8.0);
        assert_eq!(minutes_to_hours(535), 8.92);
        assert_eq!(minutes_to_hours(50), 0.83);
        assert_eq!(minutes_to_hours(0), 0.0);
    }

    #[test]
    fn company_local_round_trips() {
        let utc = Utc.with_ymd_and_hms(2025, 3, 3, 4, 20, 0).unwrap();
        let local = to_company_local(utc, 330);
        assert_eq!(local, d(2025, 3, 3).and_hms_opt(9, 50, 0).unwrap());
        assert_eq!(to_utc(local, 330), utc.naive_utc());
    }

    #[test]
    fn company_date_crosses_midnight_before_utc() {
        // 20:00 UTC is already the next day at UTC+5:30
        let utc = Utc.with_ymd_and_hms(2025, 3, 3, 20, 0, 0).unwrap();
        assert_eq!(today_in_company(utc, 330), d(2025, 3, 4));
        assert_eq!(today_in_company(utc, 0), d(2025, 3, 3));
    }
}
