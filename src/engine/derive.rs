//! Single-day attendance derivation. Inputs are company-local instants; the
//! caller is responsible for the UTC conversion at the boundary.

use chrono::{NaiveDate, NaiveDateTime};

use crate::engine::schedule::ResolvedSchedule;
use crate::engine::time::{at_time_of_day, minutes_between, minutes_to_hours};
use crate::model::attendance::AttendanceStatus;

/// 8 hours on the clock counts as a full day.
pub const PRESENT_MIN_MINUTES: i64 = 480;
/// 4 hours counts as a half day. Both thresholds are fixed, not
/// per-schedule.
pub const HALF_DAY_MIN_MINUTES: i64 = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct DayDerivation {
    pub status: AttendanceStatus,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub overtime_minutes: i64,
    pub overtime_hours: f64,
}

impl DayDerivation {
    fn zeroed(status: AttendanceStatus) -> Self {
        DayDerivation {
            status,
            total_minutes: 0,
            total_hours: 0.0,
            late_minutes: 0,
            early_leave_minutes: 0,
            overtime_minutes: 0,
            overtime_hours: 0.0,
        }
    }
}

/// Derives status and minute counters for one day.
///
/// A record missing either endpoint reads as `absent` with zeroed counters;
/// an open check-in stays that way until the sweeper or a manual edit closes
/// it.
pub fn derive_day(
    date: NaiveDate,
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
    schedule: &ResolvedSchedule,
) -> DayDerivation {
    let (check_in, check_out) = match (check_in, check_out) {
        (Some(ci), Some(co)) => (ci, co),
        _ => return DayDerivation::zeroed(AttendanceStatus::Absent),
    };

    let fixed_in = at_time_of_day(date, schedule.fixed_in);
    let fixed_out = at_time_of_day(date, schedule.fixed_out);

    let total_minutes = minutes_between(check_in, check_out);

    let late_minutes = if check_in > fixed_in {
        minutes_between(fixed_in, check_in)
    } else {
        0
    };

    let early_leave_minutes = if check_out < fixed_out {
        minutes_between(check_out, fixed_out)
    } else {
        0
    };

    let overtime_minutes = if check_out > fixed_out {
        minutes_between(fixed_out, check_out)
    } else {
        0
    };

    let status = if total_minutes >= PRESENT_MIN_MINUTES {
        AttendanceStatus::Present
    } else if total_minutes >= HALF_DAY_MIN_MINUTES {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Absent
    };

    DayDerivation {
        status,
        total_minutes,
        total_hours: minutes_to_hours(total_minutes),
        late_minutes,
        early_leave_minutes,
        overtime_minutes,
        overtime_hours: minutes_to_hours(overtime_minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};
    use std::collections::HashSet;

    fn schedule() -> ResolvedSchedule {
        ResolvedSchedule {
            fixed_in: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            fixed_out: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            weekly_off: HashSet::from([Weekday::Sun]),
            grace_minutes: 15,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn missing_endpoint_reads_absent_with_zeroes() {
        let open = derive_day(day(), Some(at(10, 0)), None, &schedule());
        assert_eq!(open.status, AttendanceStatus::Absent);
        assert_eq!(open.total_minutes, 0);
        assert_eq!(open.overtime_hours, 0.0);

        let none = derive_day(day(), None, None, &schedule());
        assert_eq!(none, DayDerivation::zeroed(AttendanceStatus::Absent));
    }

    #[test]
    fn status_thresholds() {
        // exactly 8h -> present
        let d = derive_day(day(), Some(at(10, 0)), Some(at(18, 0)), &schedule());
        assert_eq!(d.total_minutes, 480);
        assert_eq!(d.status, AttendanceStatus::Present);

        // 4h..8h -> half-day
        let d = derive_day(day(), Some(at(10, 0)), Some(at(14, 0)), &schedule());
        assert_eq!(d.total_minutes, 240);
        assert_eq!(d.status, AttendanceStatus::HalfDay);

        let d = derive_day(day(), Some(at(10, 0)), Some(at(17, 59)), &schedule());
        assert_eq!(d.status, AttendanceStatus::HalfDay);

        // under 4h -> absent
        let d = derive_day(day(), Some(at(10, 0)), Some(at(13, 59)), &schedule());
        assert_eq!(d.status, AttendanceStatus::Absent);
    }

    #[test]
    fn late_early_and_overtime_minutes() {
        // 25 late, left 30 early
        let d = derive_day(day(), Some(at(10, 25)), Some(at(18, 0)), &schedule());
        assert_eq!(d.late_minutes, 25);
        assert_eq!(d.early_leave_minutes, 30);
        assert_eq!(d.overtime_minutes, 0);

        // on time, 90 overtime
        let d = derive_day(day(), Some(at(9, 50)), Some(at(20, 0)), &schedule());
        assert_eq!(d.late_minutes, 0);
        assert_eq!(d.early_leave_minutes, 0);
        assert_eq!(d.overtime_minutes, 90);
        assert_eq!(d.overtime_hours, 1.5);
    }

    #[test]
    fn checkout_before_checkin_clamps_to_zero() {
        let d = derive_day(day(), Some(at(18, 0)), Some(at(10, 0)), &schedule());
        assert_eq!(d.total_minutes, 0);
        assert_eq!(d.status, AttendanceStatus::Absent);
    }

    #[test]
    fn auto_checkout_scenario_reads_present() {
        // in 09:50, closed by the sweeper at 18:45 (out 18:30 + grace 15)
        let d = derive_day(day(), Some(at(9, 50)), Some(at(18, 45)), &schedule());
        assert_eq!(d.total_minutes, 535);
        assert_eq!(d.status, AttendanceStatus::Present);
        assert_eq!(d.total_hours, 8.92);
        assert_eq!(d.overtime_minutes, 15);
    }
}
