//! Shared persistence queries used by the engine-facing handlers and the
//! sweeper. Every filter is scoped by `company_id`; handlers own their
//! one-off CRUD statements.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::engine::derive::DayDerivation;
use crate::model::{
    attendance::{Attendance, AttendanceStatus, LogType},
    company::Company,
    employee::Employee,
    holiday::OfficeHoliday,
    leave::Leave,
    work_schedule::WorkSchedule,
};

const ATTENDANCE_COLS: &str = "id, company_id, employee_id, date, check_in, check_out, status, \
     total_minutes, total_hours, late_minutes, early_leave_minutes, overtime_minutes, \
     overtime_hours, log_type, auto_checkout";

pub async fn fetch_company(pool: &MySqlPool, company_id: u64) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT id, name, default_in_time, default_out_time, default_weekly_off, \
         default_grace_minutes, tz_offset_minutes FROM companies WHERE id = ?",
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_companies(pool: &MySqlPool) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT id, name, default_in_time, default_out_time, default_weekly_off, \
         default_grace_minutes, tz_offset_minutes FROM companies",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_employee(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "SELECT id, company_id, employee_code, first_name, last_name, email, phone, \
         base_salary, hire_date, status FROM employees WHERE id = ? AND company_id = ?",
    )
    .bind(employee_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_employee_ids(pool: &MySqlPool, company_id: u64) -> Result<Vec<u64>, sqlx::Error> {
    sqlx::query_scalar::<_, u64>("SELECT id FROM employees WHERE company_id = ?")
        .bind(company_id)
        .fetch_all(pool)
        .await
}

pub async fn fetch_active_schedule(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
) -> Result<Option<WorkSchedule>, sqlx::Error> {
    sqlx::query_as::<_, WorkSchedule>(
        "SELECT id, company_id, employee_id, in_time, out_time, weekly_off, grace_minutes, \
         shift_type, effective_from, effective_to FROM work_schedules \
         WHERE employee_id = ? AND company_id = ? AND effective_to IS NULL \
         ORDER BY effective_from DESC LIMIT 1",
    )
    .bind(employee_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_attendance_on(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLS} FROM attendance WHERE company_id = ? AND employee_id = ? AND date = ?"
    ))
    .bind(company_id)
    .bind(employee_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_attendance_range(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLS} FROM attendance \
         WHERE company_id = ? AND employee_id = ? AND date BETWEEN ? AND ? ORDER BY date"
    ))
    .bind(company_id)
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn open_attendance_for_date(
    pool: &MySqlPool,
    company_id: u64,
    date: NaiveDate,
) -> Result<Vec<Attendance>, sqlx::Error> {
    sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLS} FROM attendance \
         WHERE company_id = ? AND date = ? AND check_in IS NOT NULL AND check_out IS NULL"
    ))
    .bind(company_id)
    .bind(date)
    .fetch_all(pool)
    .await
}

/// Conditional close: only fires while `check_out` is still NULL, so two
/// concurrent sweep passes cannot double-write the same record.
pub async fn close_attendance_if_open(
    pool: &MySqlPool,
    attendance_id: u64,
    check_out_utc: NaiveDateTime,
    derived: &DayDerivation,
    auto_checkout: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE attendance SET check_out = ?, status = ?, total_minutes = ?, total_hours = ?, \
         late_minutes = ?, early_leave_minutes = ?, overtime_minutes = ?, overtime_hours = ?, \
         auto_checkout = ? WHERE id = ? AND check_out IS NULL",
    )
    .bind(check_out_utc)
    .bind(derived.status.to_string())
    .bind(derived.total_minutes)
    .bind(derived.total_hours)
    .bind(derived.late_minutes)
    .bind(derived.early_leave_minutes)
    .bind(derived.overtime_minutes)
    .bind(derived.overtime_hours)
    .bind(auto_checkout)
    .bind(attendance_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_approved_leaves_overlapping(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "SELECT id, company_id, employee_id, start_date, end_date, leave_type, status, created_at \
         FROM leaves WHERE company_id = ? AND employee_id = ? AND status = 'approved' \
         AND start_date <= ? AND end_date >= ?",
    )
    .bind(company_id)
    .bind(employee_id)
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await
}

pub async fn has_approved_leave_on(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
    date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM leaves WHERE company_id = ? AND employee_id = ? \
         AND status = 'approved' AND start_date <= ? AND end_date >= ?",
    )
    .bind(company_id)
    .bind(employee_id)
    .bind(date)
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

pub async fn fetch_holidays_overlapping(
    pool: &MySqlPool,
    company_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OfficeHoliday>, sqlx::Error> {
    sqlx::query_as::<_, OfficeHoliday>(
        "SELECT id, company_id, title, start_date, end_date, holiday_type, is_paid, total_days, \
         description FROM office_holidays WHERE company_id = ? AND start_date <= ? AND end_date >= ?",
    )
    .bind(company_id)
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await
}

/// Bulk upsert of synthetic "holiday" rows for every (employee, date) pair.
/// Last write wins; re-running converges to the same end state. Rows are
/// chunked to keep statements under the packet limit.
pub async fn upsert_holiday_attendance(
    pool: &MySqlPool,
    company_id: u64,
    employee_ids: &[u64],
    dates: &[NaiveDate],
) -> Result<u64, sqlx::Error> {
    let pairs: Vec<(u64, NaiveDate)> = employee_ids
        .iter()
        .flat_map(|&emp| dates.iter().map(move |&d| (emp, d)))
        .collect();

    let mut written = 0u64;
    for chunk in pairs.chunks(500) {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO attendance (company_id, employee_id, date, check_in, check_out, status, \
             total_minutes, total_hours, late_minutes, early_leave_minutes, overtime_minutes, \
             overtime_hours, log_type, auto_checkout) ",
        );
        qb.push_values(chunk, |mut b, (employee_id, date)| {
            b.push_bind(company_id)
                .push_bind(employee_id)
                .push_bind(date)
                .push_bind(None::<NaiveDateTime>)
                .push_bind(None::<NaiveDateTime>)
                .push_bind(AttendanceStatus::Holiday.to_string())
                .push_bind(0i64)
                .push_bind(0f64)
                .push_bind(0i64)
                .push_bind(0i64)
                .push_bind(0i64)
                .push_bind(0f64)
                .push_bind(LogType::System.to_string())
                .push_bind(false);
        });
        qb.push(
            " ON DUPLICATE KEY UPDATE check_in = VALUES(check_in), check_out = VALUES(check_out), \
             status = VALUES(status), total_minutes = VALUES(total_minutes), \
             total_hours = VALUES(total_hours), late_minutes = VALUES(late_minutes), \
             early_leave_minutes = VALUES(early_leave_minutes), \
             overtime_minutes = VALUES(overtime_minutes), overtime_hours = VALUES(overtime_hours), \
             log_type = VALUES(log_type), auto_checkout = VALUES(auto_checkout)",
        );
        let result = qb.build().execute(pool).await?;
        written += result.rows_affected();
    }
    Ok(written)
}

pub async fn delete_holiday_attendance(
    pool: &MySqlPool,
    company_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM attendance WHERE company_id = ? AND status = 'holiday' \
         AND date BETWEEN ? AND ?",
    )
    .bind(company_id)
    .bind(start)
    .bind(end)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Payroll summary upsert keyed (employee_id, month); re-generation
/// overwrites the prior row.
#[allow(clippy::too_many_arguments)]
pub async fn upsert_payroll(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
    month: NaiveDate,
    summary: &crate::engine::payroll::PayrollSummary,
    base_salary: f64,
    net_payable: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO payroll (company_id, employee_id, month, present_days, paid_leaves, \
         unpaid_leaves, office_holidays, weekly_offs, missing_days, overtime_hours, \
         total_working_days, base_salary, net_payable) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON DUPLICATE KEY UPDATE present_days = VALUES(present_days), \
         paid_leaves = VALUES(paid_leaves), unpaid_leaves = VALUES(unpaid_leaves), \
         office_holidays = VALUES(office_holidays), weekly_offs = VALUES(weekly_offs), \
         missing_days = VALUES(missing_days), overtime_hours = VALUES(overtime_hours), \
         total_working_days = VALUES(total_working_days), base_salary = VALUES(base_salary), \
         net_payable = VALUES(net_payable)",
    )
    .bind(company_id)
    .bind(employee_id)
    .bind(month)
    .bind(summary.present_days)
    .bind(summary.paid_leaves)
    .bind(summary.unpaid_leaves)
    .bind(summary.office_holidays)
    .bind(summary.weekly_offs)
    .bind(summary.missing_days)
    .bind(summary.overtime_hours)
    .bind(summary.total_working_days)
    .bind(base_salary)
    .bind(net_payable)
    .execute(pool)
    .await?;
    Ok(())
}
