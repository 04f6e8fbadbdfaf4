//! Effective-schedule resolution: employee's active work schedule, then the
//! company defaults, then the hardcoded fallback shift. Never fails.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use once_cell::sync::Lazy;

use crate::error::ApiError;
use crate::model::{company::Company, work_schedule::WorkSchedule};

static FALLBACK_IN: Lazy<NaiveTime> = Lazy::new(|| NaiveTime::from_hms_opt(10, 0, 0).unwrap());
static FALLBACK_OUT: Lazy<NaiveTime> = Lazy::new(|| NaiveTime::from_hms_opt(18, 30, 0).unwrap());
const FALLBACK_GRACE_MINUTES: u32 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchedule {
    pub fixed_in: NaiveTime,
    pub fixed_out: NaiveTime,
    pub weekly_off: HashSet<Weekday>,
    pub grace_minutes: u32,
}

impl ResolvedSchedule {
    pub fn is_weekly_off(&self, weekday: Weekday) -> bool {
        self.weekly_off.contains(&weekday)
    }
}

/// Strict parse of a comma-joined weekday list ("Sunday,Saturday") for input
/// boundaries. Unknown names are `InvalidInput`.
pub fn parse_weekly_off(raw: &str) -> Result<HashSet<Weekday>, ApiError> {
    let mut days = HashSet::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let day = Weekday::from_str(name)
            .map_err(|_| ApiError::invalid(format!("invalid weekday name: {:?}", name)))?;
        days.insert(day);
    }
    Ok(days)
}

/// Lenient variant for stored values: unparseable entries are dropped rather
/// than failing resolution.
fn weekly_off_from_stored(raw: &str) -> HashSet<Weekday> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|name| Weekday::from_str(name).ok())
        .collect()
}

/// Full English weekday name, as stored in weekly-off lists and emitted in
/// the payroll ledger's `Day` column.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Field-by-field fallback chain: schedule -> company default -> fixed
/// constants ("10:00"/"18:30", Sunday off, 15 minutes grace).
pub fn resolve(schedule: Option<&WorkSchedule>, company: Option<&Company>) -> ResolvedSchedule {
    let fixed_in = schedule
        .map(|s| s.in_time)
        .or_else(|| company.and_then(|c| c.default_in_time))
        .unwrap_or(*FALLBACK_IN);

    let fixed_out = schedule
        .map(|s| s.out_time)
        .or_else(|| company.and_then(|c| c.default_out_time))
        .unwrap_or(*FALLBACK_OUT);

    let weekly_off = schedule
        .map(|s| weekly_off_from_stored(&s.weekly_off))
        .filter(|set| !set.is_empty())
        .or_else(|| {
            company
                .and_then(|c| c.default_weekly_off.as_deref())
                .map(weekly_off_from_stored)
                .filter(|set| !set.is_empty())
        })
        .unwrap_or_else(|| HashSet::from([Weekday::Sun]));

    let grace_minutes = schedule
        .map(|s| s.grace_minutes)
        .or_else(|| company.and_then(|c| c.default_grace_minutes))
        .unwrap_or(FALLBACK_GRACE_MINUTES);

    ResolvedSchedule {
        fixed_in,
        fixed_out,
        weekly_off,
        grace_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn schedule(in_time: &str, out_time: &str, weekly_off: &str) -> WorkSchedule {
        WorkSchedule {
            id: 1,
            company_id: 1,
            employee_id: 7,
            in_time: NaiveTime::parse_from_str(in_time, "%H:%M").unwrap(),
            out_time: NaiveTime::parse_from_str(out_time, "%H:%M").unwrap(),
            weekly_off: weekly_off.to_string(),
            grace_minutes: 10,
            shift_type: "fixed".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            effective_to: None,
        }
    }

    fn company() -> Company {
        Company {
            id: 1,
            name: "Acme".to_string(),
            default_in_time: NaiveTime::from_hms_opt(9, 0, 0),
            default_out_time: NaiveTime::from_hms_opt(17, 0, 0),
            default_weekly_off: Some("Friday,Saturday".to_string()),
            default_grace_minutes: Some(20),
            tz_offset_minutes: 330,
        }
    }

    #[test]
    fn schedule_wins_over_company_defaults() {
        let s = schedule("08:30", "16:30", "Sunday");
        let resolved = resolve(Some(&s), Some(&company()));
        assert_eq!(resolved.fixed_in, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(resolved.fixed_out, NaiveTime::from_hms_opt(16, 30, 0).unwrap());
        assert_eq!(resolved.weekly_off, HashSet::from([Weekday::Sun]));
        assert_eq!(resolved.grace_minutes, 10);
    }

    #[test]
    fn falls_back_to_company_defaults() {
        let resolved = resolve(None, Some(&company()));
        assert_eq!(resolved.fixed_in, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(resolved.fixed_out, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(
            resolved.weekly_off,
            HashSet::from([Weekday::Fri, Weekday::Sat])
        );
        assert_eq!(resolved.grace_minutes, 20);
    }

    #[test]
    fn hardcoded_fallback_when_nothing_configured() {
        let resolved = resolve(None, None);
        assert_eq!(resolved.fixed_in, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(
            resolved.fixed_out,
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
        assert_eq!(resolved.weekly_off, HashSet::from([Weekday::Sun]));
        assert_eq!(resolved.grace_minutes, 15);
    }

    #[test]
    fn empty_weekly_off_string_falls_through() {
        let s = schedule("08:30", "16:30", "");
        let resolved = resolve(Some(&s), Some(&company()));
        assert_eq!(
            resolved.weekly_off,
            HashSet::from([Weekday::Fri, Weekday::Sat])
        );
    }

    #[test]
    fn strict_parse_rejects_unknown_day() {
        assert!(parse_weekly_off("Sunday,Funday").is_err());
        let days = parse_weekly_off("Saturday, Sunday").unwrap();
        assert_eq!(days, HashSet::from([Weekday::Sat, Weekday::Sun]));
    }

    #[test]
    fn weekday_names_are_full() {
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
        assert_eq!(weekday_name(Weekday::Wed), "Wednesday");
    }
}
