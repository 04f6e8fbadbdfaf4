use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::policy::Action;
use crate::engine::schedule::{parse_weekly_off, resolve, weekday_name};
use crate::engine::time::parse_time_of_day;
use crate::error::ApiError;
use crate::model::work_schedule::ShiftType;
use crate::store;

#[derive(Deserialize, ToSchema)]
pub struct AssignSchedule {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "10:00")]
    pub in_time: String,
    #[schema(example = "18:30")]
    pub out_time: String,
    #[schema(example = json!(["Sunday"]))]
    pub weekly_off: Vec<String>,
    #[schema(example = 15)]
    pub grace_minutes: u32,
    #[schema(example = "fixed")]
    pub shift_type: ShiftType,
    #[schema(example = "2025-03-01", format = "date", value_type = String)]
    pub effective_from: NaiveDate,
}

/// Assigns a new work schedule. The previous active schedule (if any) is
/// closed the day before the new one starts, preserving the at-most-one-
/// active invariant while keeping history queryable.
#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    request_body = AssignSchedule,
    responses(
        (status = 201, description = "Schedule assigned", body = Object, example = json!({
            "message": "Schedule assigned",
            "id": 12
        })),
        (status = 400, description = "Bad time of day or weekday name"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "A schedule starting on this date already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn assign_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignSchedule>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageSchedules, auth.company_id)?;

    store::fetch_employee(pool.get_ref(), auth.company_id, payload.employee_id)
        .await
        .map_err(|e| ApiError::db("fetch employee", e))?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    let in_time = parse_time_of_day(&payload.in_time)?;
    let out_time = parse_time_of_day(&payload.out_time)?;
    if out_time <= in_time {
        return Err(ApiError::invalid("out_time must be after in_time"));
    }

    // canonicalize to sorted full names before storing
    let mut days: Vec<_> = parse_weekly_off(&payload.weekly_off.join(","))?
        .into_iter()
        .collect();
    days.sort_by_key(|d| d.num_days_from_monday());
    let weekly_off = days
        .iter()
        .map(|d| weekday_name(*d))
        .collect::<Vec<_>>()
        .join(",");

    let day_before = payload
        .effective_from
        .pred_opt()
        .ok_or_else(|| ApiError::invalid("effective_from out of range"))?;

    sqlx::query(
        "UPDATE work_schedules SET effective_to = ? \
         WHERE employee_id = ? AND company_id = ? AND effective_to IS NULL",
    )
    .bind(day_before)
    .bind(payload.employee_id)
    .bind(auth.company_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("close previous schedule", e))?;

    let result = sqlx::query(
        "INSERT INTO work_schedules \
         (company_id, employee_id, in_time, out_time, weekly_off, grace_minutes, shift_type, \
         effective_from, effective_to) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)",
    )
    .bind(auth.company_id)
    .bind(payload.employee_id)
    .bind(in_time)
    .bind(out_time)
    .bind(&weekly_off)
    .bind(payload.grace_minutes)
    .bind(payload.shift_type.to_string())
    .bind(payload.effective_from)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        ApiError::db_or_conflict(
            "insert schedule",
            "A schedule starting on this date already exists",
            e,
        )
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Schedule assigned",
        "id": result.last_insert_id()
    })))
}

/// The schedule the engine would use for this employee right now, after the
/// employee -> company -> fallback chain.
#[utoipa::path(
    get,
    path = "/api/v1/schedules/effective/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Resolved schedule", body = Object, example = json!({
            "fixed_in": "10:00",
            "fixed_out": "18:30",
            "weekly_off": ["Sunday"],
            "grace_minutes": 15
        })),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn effective_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();
    if auth.employee_id != Some(employee_id) {
        auth.authorize(Action::ViewEmployees, auth.company_id)?;
    }

    store::fetch_employee(pool.get_ref(), auth.company_id, employee_id)
        .await
        .map_err(|e| ApiError::db("fetch employee", e))?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    let company = store::fetch_company(pool.get_ref(), auth.company_id)
        .await
        .map_err(|e| ApiError::db("fetch company", e))?;
    let active = store::fetch_active_schedule(pool.get_ref(), auth.company_id, employee_id)
        .await
        .map_err(|e| ApiError::db("fetch schedule", e))?;

    let resolved = resolve(active.as_ref(), company.as_ref());
    let mut days: Vec<_> = resolved.weekly_off.iter().copied().collect();
    days.sort_by_key(|d| d.num_days_from_monday());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "fixed_in": resolved.fixed_in.format("%H:%M").to_string(),
        "fixed_out": resolved.fixed_out.format("%H:%M").to_string(),
        "weekly_off": days.iter().map(|d| weekday_name(*d)).collect::<Vec<_>>(),
        "grace_minutes": resolved.grace_minutes
    })))
}
