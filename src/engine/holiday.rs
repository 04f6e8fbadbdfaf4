//! Pure parts of holiday propagation: range validation, inclusive day
//! counting, and expansion into calendar dates. The bulk writes live in
//! `store`.

use chrono::{Duration, NaiveDate};

use crate::error::ApiError;
use crate::model::holiday::HolidayType;

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::invalid(format!(
            "start_date {} is after end_date {}",
            start, end
        )));
    }
    Ok(())
}

/// Inclusive day count between two midnight-normalized dates.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

pub fn is_paid(holiday_type: HolidayType) -> bool {
    holiday_type == HolidayType::Paid
}

/// Expands [start, end] into individual dates, optionally capped (payroll
/// never expands past its effective end).
pub fn expand_range(start: NaiveDate, end: NaiveDate, cap: Option<NaiveDate>) -> Vec<NaiveDate> {
    let end = match cap {
        Some(cap) if cap < end => cap,
        _ => end,
    };
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day);
        day += Duration::days(1);
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(validate_range(d(2025, 3, 5), d(2025, 3, 4)).is_err());
        assert!(validate_range(d(2025, 3, 5), d(2025, 3, 5)).is_ok());
    }

    #[test]
    fn inclusive_day_count() {
        assert_eq!(inclusive_days(d(2025, 3, 5), d(2025, 3, 5)), 1);
        assert_eq!(inclusive_days(d(2025, 3, 5), d(2025, 3, 7)), 3);
        // across a month boundary
        assert_eq!(inclusive_days(d(2025, 2, 27), d(2025, 3, 2)), 4);
    }

    #[test]
    fn only_paid_type_is_paid() {
        assert!(is_paid(HolidayType::Paid));
        assert!(!is_paid(HolidayType::Unpaid));
        assert!(!is_paid(HolidayType::National));
        assert!(!is_paid(HolidayType::Festival));
    }

    #[test]
    fn expansion_and_cap() {
        let dates = expand_range(d(2025, 3, 5), d(2025, 3, 7), None);
        assert_eq!(dates, vec![d(2025, 3, 5), d(2025, 3, 6), d(2025, 3, 7)]);

        let capped = expand_range(d(2025, 3, 5), d(2025, 3, 7), Some(d(2025, 3, 6)));
        assert_eq!(capped, vec![d(2025, 3, 5), d(2025, 3, 6)]);

        // cap before start yields nothing
        assert!(expand_range(d(2025, 3, 5), d(2025, 3, 7), Some(d(2025, 3, 4))).is_empty());
    }
}
