use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Shift definition for one employee. A row with `effective_to = NULL` is the
/// active schedule; at most one active row exists per employee.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkSchedule {
    pub id: u64,
    pub company_id: u64,
    pub employee_id: u64,
    pub in_time: NaiveTime,
    pub out_time: NaiveTime,
    /// Comma-joined weekday names, e.g. "Sunday" or "Friday,Saturday".
    pub weekly_off: String,
    pub grace_minutes: u32,
    pub shift_type: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Fixed,
    Flexible,
}
