use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Tenant root. Per-company shift defaults feed the schedule resolver when an
/// employee has no active work schedule of their own.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: u64,
    pub name: String,
    pub default_in_time: Option<NaiveTime>,
    pub default_out_time: Option<NaiveTime>,
    /// Comma-joined weekday names, e.g. "Sunday" or "Saturday,Sunday".
    pub default_weekly_off: Option<String>,
    pub default_grace_minutes: Option<u32>,
    /// Offset from UTC in minutes. All wall-clock arithmetic happens after a
    /// single conversion at this boundary.
    pub tz_offset_minutes: i32,
}
