use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One row per (employee_id, date), enforced by a unique key. Instants are
/// stored in UTC; conversion to company wall-clock time happens once, at the
/// engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub company_id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    pub status: String,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub late_minutes: i64,
    pub early_leave_minutes: i64,
    pub overtime_minutes: i64,
    pub overtime_hours: f64,
    pub log_type: String,
    pub auto_checkout: bool,
}

/// Derived status values stored in the `status` column. Status is computed,
/// never trusted as input, except for manual override edits.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    #[strum(serialize = "present")]
    #[serde(rename = "present")]
    Present,
    #[strum(serialize = "half-day")]
    #[serde(rename = "half-day")]
    HalfDay,
    #[strum(serialize = "absent")]
    #[serde(rename = "absent")]
    Absent,
    #[strum(serialize = "holiday")]
    #[serde(rename = "holiday")]
    Holiday,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Written by check-in/check-out endpoints.
    #[strum(serialize = "self")]
    #[serde(rename = "self")]
    SelfLog,
    /// Written by an HR/admin edit.
    Manual,
    /// Written by holiday propagation or the auto-checkout sweeper.
    System,
}
