use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One summary per (employee_id, month), keyed by the first day of the month.
/// Re-generation overwrites the prior row. Day counters are decimal: a
/// half-day contributes 0.5 to `present_days` and `total_working_days`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    pub id: u64,
    pub company_id: u64,
    pub employee_id: u64,
    #[schema(example = "2025-03-01", value_type = String, format = "date")]
    pub month: NaiveDate,
    pub present_days: f64,
    pub paid_leaves: i64,
    pub unpaid_leaves: i64,
    pub office_holidays: i64,
    pub weekly_offs: i64,
    pub missing_days: i64,
    pub overtime_hours: f64,
    pub total_working_days: f64,
    pub base_salary: f64,
    pub net_payable: f64,
}
