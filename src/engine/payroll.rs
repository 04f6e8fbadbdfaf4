//! Monthly payroll aggregation: walks every day of a (possibly clamped)
//! month, classifies it through the strict priority chain
//! `office holiday > leave > weekly off > attendance > missing`, and emits a
//! per-day ledger plus a summary. Pure: all records are fetched by the
//! caller and passed in.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::schedule::weekday_name;
use crate::engine::time::round2;
use crate::error::ApiError;
use crate::model::attendance::AttendanceStatus;

/// A payroll month parsed from a "MonthName YYYY" label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub last_day: NaiveDate,
}

impl MonthWindow {
    pub fn parse(label: &str) -> Result<Self, ApiError> {
        let start = NaiveDate::parse_from_str(&format!("{} 1", label.trim()), "%B %Y %d")
            .map_err(|_| {
                ApiError::invalid(format!(
                    "invalid month label: {:?}, expected e.g. \"March 2025\"",
                    label
                ))
            })?;
        let last_day = start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| ApiError::invalid("month out of supported range"))?;
        Ok(MonthWindow { start, last_day })
    }

    pub fn days_in_month(&self) -> i64 {
        (self.last_day - self.start).num_days() + 1
    }

    /// Payroll never projects into the future: the walk ends at
    /// min(last day of month, today). `None` when the month has not started
    /// yet.
    pub fn effective_end(&self, today: NaiveDate) -> Option<NaiveDate> {
        if today < self.start {
            return None;
        }
        Some(self.last_day.min(today))
    }
}

/// Approved leave range with its pay classification already resolved.
#[derive(Debug, Clone, Copy)]
pub struct LeaveSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub paid: bool,
}

impl LeaveSpan {
    fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One attendance row, already shifted to company-local time.
#[derive(Debug, Clone)]
pub struct AttendanceDay {
    pub status: AttendanceStatus,
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    pub total_hours: f64,
    pub overtime_hours: f64,
}

pub struct PayrollInputs<'a> {
    pub holidays: &'a HashSet<NaiveDate>,
    pub leaves: &'a [LeaveSpan],
    pub weekly_off: &'a HashSet<chrono::Weekday>,
    pub attendance: &'a HashMap<NaiveDate, AttendanceDay>,
}

/// Terminal classification of a single day; exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClass {
    OfficeHoliday,
    PaidLeave,
    UnpaidLeave,
    WeeklyOff,
    Attended(AttendanceStatus),
    Missing,
}

impl DayClass {
    pub fn label(&self) -> String {
        match self {
            DayClass::OfficeHoliday => "office holiday".to_string(),
            DayClass::PaidLeave => "paid leave".to_string(),
            DayClass::UnpaidLeave => "unpaid leave".to_string(),
            DayClass::WeeklyOff => "weekly off".to_string(),
            DayClass::Attended(status) => status.to_string(),
            DayClass::Missing => "missing".to_string(),
        }
    }
}

/// Strict priority resolution. Weekly-off only applies when no attendance
/// row exists for the day: an employee who worked their off day is counted
/// by what the attendance row derived.
pub fn classify_day(date: NaiveDate, inputs: &PayrollInputs) -> DayClass {
    if inputs.holidays.contains(&date) {
        return DayClass::OfficeHoliday;
    }
    if let Some(leave) = inputs.leaves.iter().find(|l| l.covers(date)) {
        return if leave.paid {
            DayClass::PaidLeave
        } else {
            DayClass::UnpaidLeave
        };
    }
    let attended = inputs.attendance.get(&date);
    if inputs.weekly_off.contains(&date.weekday()) && attended.is_none() {
        return DayClass::WeeklyOff;
    }
    match attended {
        Some(day) => DayClass::Attended(day.status),
        None => DayClass::Missing,
    }
}

/// One ledger row per day. Field names are a stable export contract consumed
/// by the CSV/PDF surface; do not rename.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerRow {
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "2025-03-03")]
    pub date: String,
    #[schema(example = "Monday")]
    pub day: String,
    #[schema(example = "present")]
    pub status: String,
    #[schema(example = "09:50", nullable = true)]
    pub check_in: Option<String>,
    #[schema(example = "18:45", nullable = true)]
    pub check_out: Option<String>,
    #[schema(example = 8.92)]
    pub total_hours: f64,
    #[schema(example = 0.25)]
    pub overtime_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollSummary {
    /// Full days plus 0.5 per half-day; decimal by design.
    #[schema(example = 17.5)]
    pub present_days: f64,
    pub paid_leaves: i64,
    pub unpaid_leaves: i64,
    pub office_holidays: i64,
    pub weekly_offs: i64,
    pub missing_days: i64,
    #[schema(example = 3.25)]
    pub overtime_hours: f64,
    /// present + paid leaves + office holidays + weekly offs.
    #[schema(example = 24.5)]
    pub total_working_days: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyPayroll {
    pub summary: PayrollSummary,
    pub ledger: Vec<LedgerRow>,
}

fn format_instant(instant: Option<NaiveDateTime>) -> Option<String> {
    instant.map(|t| t.format("%H:%M").to_string())
}

/// Walks [window.start, effective_end] inclusive. Deterministic: identical
/// inputs yield identical summary and ledger.
pub fn compute(
    employee_code: &str,
    employee_name: &str,
    window: &MonthWindow,
    effective_end: NaiveDate,
    inputs: &PayrollInputs,
) -> MonthlyPayroll {
    let mut summary = PayrollSummary::default();
    let mut ledger = Vec::new();

    let mut date = window.start;
    while date <= effective_end {
        let class = classify_day(date, inputs);
        let attended = inputs.attendance.get(&date);

        match class {
            DayClass::OfficeHoliday => summary.office_holidays += 1,
            DayClass::PaidLeave => summary.paid_leaves += 1,
            DayClass::UnpaidLeave => summary.unpaid_leaves += 1,
            DayClass::WeeklyOff => summary.weekly_offs += 1,
            DayClass::Attended(status) => match status {
                AttendanceStatus::Present => summary.present_days += 1.0,
                AttendanceStatus::HalfDay => summary.present_days += 0.5,
                // stale propagation row surviving a holiday edit still
                // reads as a holiday
                AttendanceStatus::Holiday => summary.office_holidays += 1,
                AttendanceStatus::Absent => {}
            },
            DayClass::Missing => summary.missing_days += 1,
        }

        if let (DayClass::Attended(_), Some(day)) = (class, attended) {
            summary.overtime_hours += day.overtime_hours;
        }

        ledger.push(LedgerRow {
            employee_code: employee_code.to_string(),
            name: employee_name.to_string(),
            date: date.to_string(),
            day: weekday_name(date.weekday()).to_string(),
            status: class.label(),
            check_in: attended.and_then(|d| format_instant(d.check_in)),
            check_out: attended.and_then(|d| format_instant(d.check_out)),
            total_hours: attended.map(|d| d.total_hours).unwrap_or(0.0),
            overtime_hours: attended.map(|d| d.overtime_hours).unwrap_or(0.0),
        });

        date += Duration::days(1);
    }

    summary.overtime_hours = round2(summary.overtime_hours);
    summary.total_working_days = summary.present_days
        + summary.paid_leaves as f64
        + summary.office_holidays as f64
        + summary.weekly_offs as f64;

    MonthlyPayroll { summary, ledger }
}

/// Month pay prorated over calendar days worked or covered.
pub fn net_payable(base_salary: f64, total_working_days: f64, days_in_month: i64) -> f64 {
    if days_in_month <= 0 {
        return 0.0;
    }
    round2(base_salary * total_working_days / days_in_month as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn attended(status: AttendanceStatus, total_hours: f64, overtime_hours: f64) -> AttendanceDay {
        AttendanceDay {
            status,
            check_in: None,
            check_out: None,
            total_hours,
            overtime_hours,
        }
    }

    #[test]
    fn parses_month_labels() {
        let w = MonthWindow::parse("March 2025").unwrap();
        assert_eq!(w.start, d(2025, 3, 1));
        assert_eq!(w.last_day, d(2025, 3, 31));
        assert_eq!(w.days_in_month(), 31);

        let feb = MonthWindow::parse("February 2024").unwrap();
        assert_eq!(feb.last_day, d(2024, 2, 29));

        assert!(MonthWindow::parse("Martober 2025").is_err());
        assert!(MonthWindow::parse("March").is_err());
        assert!(MonthWindow::parse("").is_err());
    }

    #[test]
    fn effective_end_clamps_to_today() {
        let w = MonthWindow::parse("March 2025").unwrap();
        assert_eq!(w.effective_end(d(2025, 3, 15)), Some(d(2025, 3, 15)));
        assert_eq!(w.effective_end(d(2025, 4, 20)), Some(d(2025, 3, 31)));
        assert_eq!(w.effective_end(d(2025, 2, 28)), None);
    }

    #[test]
    fn priority_chain_is_strict() {
        let holidays = HashSet::from([d(2025, 3, 9)]);
        let leaves = [LeaveSpan {
            start: d(2025, 3, 9),
            end: d(2025, 3, 10),
            paid: true,
        }];
        let weekly_off = HashSet::from([Weekday::Sun]);
        let mut attendance = HashMap::new();
        // attendance row on every contested day
        for day in [9, 10, 16] {
            attendance.insert(
                d(2025, 3, day),
                attended(AttendanceStatus::Present, 8.0, 0.0),
            );
        }
        let inputs = PayrollInputs {
            holidays: &holidays,
            leaves: &leaves,
            weekly_off: &weekly_off,
            attendance: &attendance,
        };

        // Mar 9 is a Sunday, on leave, a holiday, with an attendance row:
        // holiday wins.
        assert_eq!(classify_day(d(2025, 3, 9), &inputs), DayClass::OfficeHoliday);
        // Mar 10: leave beats attendance.
        assert_eq!(classify_day(d(2025, 3, 10), &inputs), DayClass::PaidLeave);
        // Mar 16 is a Sunday with an attendance row: the row wins over
        // weekly-off.
        assert_eq!(
            classify_day(d(2025, 3, 16), &inputs),
            DayClass::Attended(AttendanceStatus::Present)
        );
        // Mar 23 is a bare Sunday.
        assert_eq!(classify_day(d(2025, 3, 23), &inputs), DayClass::WeeklyOff);
        // Mar 11 has nothing at all.
        assert_eq!(classify_day(d(2025, 3, 11), &inputs), DayClass::Missing);
    }

    fn march_inputs() -> (
        HashSet<NaiveDate>,
        Vec<LeaveSpan>,
        HashSet<Weekday>,
        HashMap<NaiveDate, AttendanceDay>,
    ) {
        // effective end 2025-03-28: Sundays are 2, 9, 16, 23.
        let holidays = HashSet::from([d(2025, 3, 21)]);
        let leaves = vec![LeaveSpan {
            start: d(2025, 3, 10),
            end: d(2025, 3, 11),
            paid: true,
        }];
        let weekly_off = HashSet::from([Weekday::Sun]);
        let mut attendance = HashMap::new();
        for day in 3..=7 {
            attendance.insert(
                d(2025, 3, day),
                attended(AttendanceStatus::Present, 8.5, 0.5),
            );
        }
        (holidays, leaves, weekly_off, attendance)
    }

    #[test]
    fn march_2025_summary_scenario() {
        let (holidays, leaves, weekly_off, attendance) = march_inputs();
        let inputs = PayrollInputs {
            holidays: &holidays,
            leaves: &leaves,
            weekly_off: &weekly_off,
            attendance: &attendance,
        };
        let window = MonthWindow::parse("March 2025").unwrap();
        let end = window.effective_end(d(2025, 3, 28)).unwrap();

        let result = compute("EMP-001", "John Doe", &window, end, &inputs);
        let s = &result.summary;

        assert_eq!(s.present_days, 5.0);
        assert_eq!(s.paid_leaves, 2);
        assert_eq!(s.office_holidays, 1);
        assert_eq!(s.weekly_offs, 4);
        assert_eq!(s.total_working_days, 12.0);
        assert_eq!(s.missing_days, 16);
        assert_eq!(s.overtime_hours, 2.5);

        // one ledger row per day, every day classified exactly once
        assert_eq!(result.ledger.len(), 28);
        let counted = s.present_days
            + (s.paid_leaves + s.unpaid_leaves + s.office_holidays + s.weekly_offs
                + s.missing_days) as f64;
        assert_eq!(counted, 28.0);
    }

    #[test]
    fn compute_is_deterministic() {
        let (holidays, leaves, weekly_off, attendance) = march_inputs();
        let inputs = PayrollInputs {
            holidays: &holidays,
            leaves: &leaves,
            weekly_off: &weekly_off,
            attendance: &attendance,
        };
        let window = MonthWindow::parse("March 2025").unwrap();
        let end = window.effective_end(d(2025, 3, 28)).unwrap();

        let a = compute("EMP-001", "John Doe", &window, end, &inputs);
        let b = compute("EMP-001", "John Doe", &window, end, &inputs);
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.ledger.len(), b.ledger.len());
        for (x, y) in a.ledger.iter().zip(&b.ledger) {
            assert_eq!(x.date, y.date);
            assert_eq!(x.status, y.status);
            assert_eq!(x.total_hours, y.total_hours);
        }
    }

    #[test]
    fn half_days_accumulate_fractionally() {
        let holidays = HashSet::new();
        let leaves: Vec<LeaveSpan> = Vec::new();
        let weekly_off = HashSet::from([Weekday::Sun]);
        let mut attendance = HashMap::new();
        attendance.insert(d(2025, 3, 3), attended(AttendanceStatus::Present, 8.0, 0.0));
        attendance.insert(d(2025, 3, 4), attended(AttendanceStatus::HalfDay, 4.5, 0.0));
        let inputs = PayrollInputs {
            holidays: &holidays,
            leaves: &leaves,
            weekly_off: &weekly_off,
            attendance: &attendance,
        };
        let window = MonthWindow::parse("March 2025").unwrap();
        let result = compute("EMP-001", "John Doe", &window, d(2025, 3, 4), &inputs);
        assert_eq!(result.summary.present_days, 1.5);
        assert_eq!(result.summary.total_working_days, 1.5);
    }

    #[test]
    fn ledger_serializes_with_stable_export_names() {
        let row = LedgerRow {
            employee_code: "EMP-001".into(),
            name: "John Doe".into(),
            date: "2025-03-03".into(),
            day: "Monday".into(),
            status: "present".into(),
            check_in: Some("09:50".into()),
            check_out: Some("18:45".into()),
            total_hours: 8.92,
            overtime_hours: 0.25,
        };
        let v = serde_json::to_value(&row).unwrap();
        for key in [
            "EmployeeCode",
            "Name",
            "Date",
            "Day",
            "Status",
            "CheckIn",
            "CheckOut",
            "TotalHours",
            "OvertimeHours",
        ] {
            assert!(v.get(key).is_some(), "missing export field {key}");
        }
    }

    #[test]
    fn net_payable_prorates() {
        assert_eq!(net_payable(31000.0, 12.0, 31), 12000.0);
        assert_eq!(net_payable(50000.0, 0.0, 30), 0.0);
        assert_eq!(net_payable(50000.0, 30.0, 30), 50000.0);
    }
}
