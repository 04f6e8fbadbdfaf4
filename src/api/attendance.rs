use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::policy::Action;
use crate::engine::time::{parse_time_of_day, to_company_local, to_utc, today_in_company};
use crate::engine::{derive, schedule};
use crate::error::ApiError;
use crate::model::attendance::{AttendanceStatus, LogType};
use crate::store;

/// Check-in endpoint. The unique (employee_id, date) key makes the insert
/// atomic: a concurrent duplicate surfaces as 409, never a second row.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "date": "2025-03-03"
        })),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::RecordOwnAttendance, auth.company_id)?;
    let employee_id = auth.require_employee()?;

    let company = store::fetch_company(pool.get_ref(), auth.company_id)
        .await
        .map_err(|e| ApiError::db("fetch company", e))?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    let now = Utc::now();
    let today = today_in_company(now, company.tz_offset_minutes);

    sqlx::query(
        "INSERT INTO attendance (company_id, employee_id, date, check_in, check_out, status, \
         total_minutes, total_hours, late_minutes, early_leave_minutes, overtime_minutes, \
         overtime_hours, log_type, auto_checkout) \
         VALUES (?, ?, ?, ?, NULL, 'absent', 0, 0, 0, 0, 0, 0, ?, 0)",
    )
    .bind(auth.company_id)
    .bind(employee_id)
    .bind(today)
    .bind(now.naive_utc())
    .bind(LogType::SelfLog.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::db_or_conflict("insert check-in", "Already checked in today", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "date": today.to_string()
    })))
}

/// Check-out endpoint: closes today's open record and persists the derived
/// status and minute counters.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "status": "present",
            "total_hours": 8.92
        })),
        (status = 404, description = "No check-in found for today"),
        (status = 409, description = "Already checked out today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::RecordOwnAttendance, auth.company_id)?;
    let employee_id = auth.require_employee()?;

    let company = store::fetch_company(pool.get_ref(), auth.company_id)
        .await
        .map_err(|e| ApiError::db("fetch company", e))?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    let now = Utc::now();
    let today = today_in_company(now, company.tz_offset_minutes);

    let record = store::fetch_attendance_on(pool.get_ref(), auth.company_id, employee_id, today)
        .await
        .map_err(|e| ApiError::db("fetch attendance", e))?
        .ok_or_else(|| ApiError::not_found("No check-in found for today"))?;

    if record.check_out.is_some() {
        return Err(ApiError::conflict("Already checked out today"));
    }

    let active = store::fetch_active_schedule(pool.get_ref(), auth.company_id, employee_id)
        .await
        .map_err(|e| ApiError::db("fetch schedule", e))?;
    let resolved = schedule::resolve(active.as_ref(), Some(&company));

    let check_in_local = record
        .check_in
        .map(|ci| ci + chrono::Duration::minutes(company.tz_offset_minutes as i64));
    let now_local = to_company_local(now, company.tz_offset_minutes);

    let derived = derive::derive_day(today, check_in_local, Some(now_local), &resolved);

    let affected = store::close_attendance_if_open(
        pool.get_ref(),
        record.id,
        now.naive_utc(),
        &derived,
        false,
    )
    .await
    .map_err(|e| ApiError::db("close attendance", e))?;

    if affected == 0 {
        return Err(ApiError::conflict("Already checked out today"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "status": derived.status.to_string(),
        "total_hours": derived.total_hours,
        "late_minutes": derived.late_minutes,
        "early_leave_minutes": derived.early_leave_minutes,
        "overtime_hours": derived.overtime_hours
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct EditAttendance {
    /// Company-local wall-clock time, "HH:MM"
    #[schema(example = "09:45", nullable = true)]
    pub check_in: Option<String>,
    #[schema(example = "18:10", nullable = true)]
    pub check_out: Option<String>,
    /// Forces the status instead of re-deriving it
    #[schema(example = "present", nullable = true)]
    pub status: Option<AttendanceStatus>,
}

/// Manual correction by HR/admin. Times are re-derived from the edited
/// endpoints unless a forced status is supplied; either way the row is
/// stamped `log_type = manual`.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    request_body = EditAttendance,
    params(("attendance_id" = u64, Path, description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance updated", body = Object, example = json!({
            "message": "Attendance updated",
            "status": "present"
        })),
        (status = 400, description = "Bad time of day"),
        (status = 404, description = "Attendance record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn edit_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<EditAttendance>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::EditAttendance, auth.company_id)?;
    let attendance_id = path.into_inner();

    let record = sqlx::query_as::<_, crate::model::attendance::Attendance>(
        "SELECT id, company_id, employee_id, date, check_in, check_out, status, total_minutes, \
         total_hours, late_minutes, early_leave_minutes, overtime_minutes, overtime_hours, \
         log_type, auto_checkout FROM attendance WHERE id = ? AND company_id = ?",
    )
    .bind(attendance_id)
    .bind(auth.company_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("fetch attendance", e))?
    .ok_or_else(|| ApiError::not_found("Attendance record not found"))?;

    let company = store::fetch_company(pool.get_ref(), auth.company_id)
        .await
        .map_err(|e| ApiError::db("fetch company", e))?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    let offset = company.tz_offset_minutes;

    // incoming "HH:MM" strings are company-local on the record's date
    let check_in_local = match payload.check_in.as_deref() {
        Some(s) => Some(record.date.and_time(parse_time_of_day(s)?)),
        None => record
            .check_in
            .map(|ci| ci + chrono::Duration::minutes(offset as i64)),
    };
    let check_out_local = match payload.check_out.as_deref() {
        Some(s) => Some(record.date.and_time(parse_time_of_day(s)?)),
        None => record
            .check_out
            .map(|co| co + chrono::Duration::minutes(offset as i64)),
    };

    let active = store::fetch_active_schedule(pool.get_ref(), auth.company_id, record.employee_id)
        .await
        .map_err(|e| ApiError::db("fetch schedule", e))?;
    let resolved = schedule::resolve(active.as_ref(), Some(&company));

    let mut derived = derive::derive_day(record.date, check_in_local, check_out_local, &resolved);
    if let Some(forced) = payload.status {
        derived.status = forced;
    }

    sqlx::query(
        "UPDATE attendance SET check_in = ?, check_out = ?, status = ?, total_minutes = ?, \
         total_hours = ?, late_minutes = ?, early_leave_minutes = ?, overtime_minutes = ?, \
         overtime_hours = ?, log_type = ?, auto_checkout = 0 \
         WHERE id = ? AND company_id = ?",
    )
    .bind(check_in_local.map(|t| to_utc(t, offset)))
    .bind(check_out_local.map(|t| to_utc(t, offset)))
    .bind(derived.status.to_string())
    .bind(derived.total_minutes)
    .bind(derived.total_hours)
    .bind(derived.late_minutes)
    .bind(derived.early_leave_minutes)
    .bind(derived.overtime_minutes)
    .bind(derived.overtime_hours)
    .bind(LogType::Manual.to_string())
    .bind(attendance_id)
    .bind(auth.company_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("update attendance", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance updated",
        "status": derived.status.to_string(),
        "total_hours": derived.total_hours
    })))
}

#[derive(Deserialize, utoipa::IntoParams, ToSchema)]
pub struct AttendanceRangeQuery {
    #[schema(example = 1001)]
    pub employee_id: u64,
    /// Range start, "YYYY-MM-DD"
    #[schema(example = "2025-03-01")]
    pub from: String,
    /// Range end inclusive, "YYYY-MM-DD"
    #[schema(example = "2025-03-31")]
    pub to: String,
}

/// Attendance rows for an employee and date range. Employees may read their
/// own; HR/admin anyone's.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceRangeQuery),
    responses(
        (status = 200, description = "Attendance rows"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceRangeQuery>,
) -> Result<impl Responder, ApiError> {
    if auth.employee_id != Some(query.employee_id) {
        auth.authorize(Action::ViewEmployees, auth.company_id)?;
    }

    let from = parse_date(&query.from)?;
    let to = parse_date(&query.to)?;
    if from > to {
        return Err(ApiError::invalid("from is after to"));
    }

    let rows = store::fetch_attendance_range(
        pool.get_ref(),
        auth.company_id,
        query.employee_id,
        from,
        to,
    )
    .await
    .map_err(|e| ApiError::db("fetch attendance range", e))?;

    Ok(HttpResponse::Ok().json(rows))
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("invalid date: {:?}, expected YYYY-MM-DD", s)))
}
