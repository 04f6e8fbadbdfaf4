use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Inclusive date range. (company_id, start_date, end_date) is unique; the
/// propagated "holiday" attendance rows live and die with this record.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OfficeHoliday {
    pub id: u64,
    pub company_id: u64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub holiday_type: String,
    pub is_paid: bool,
    pub total_days: i64,
    pub description: Option<String>,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HolidayType {
    Paid,
    Unpaid,
    National,
    Festival,
}
