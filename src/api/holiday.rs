use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::engine::holiday::{expand_range, inclusive_days, is_paid, validate_range};
use crate::engine::policy::Action;
use crate::error::ApiError;
use crate::model::holiday::{HolidayType, OfficeHoliday};
use crate::store;

#[derive(Deserialize, ToSchema)]
pub struct HolidayPayload {
    #[schema(example = "Spring Festival")]
    pub title: String,
    #[schema(example = "2025-03-21", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-03-21", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "paid")]
    pub holiday_type: HolidayType,
    #[schema(example = "Office closed", nullable = true)]
    pub description: Option<String>,
}

/// Creates the holiday and propagates a synthetic "holiday" attendance row
/// for every employee on every date in range. The bulk write is an upsert:
/// re-running converges to the same end state.
#[utoipa::path(
    post,
    path = "/api/v1/holidays",
    request_body = HolidayPayload,
    responses(
        (status = 201, description = "Holiday created and propagated", body = Object, example = json!({
            "message": "Holiday created",
            "id": 7,
            "total_days": 1
        })),
        (status = 400, description = "Invalid date range"),
        (status = 409, description = "Holiday with this date range already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<HolidayPayload>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageHolidays, auth.company_id)?;
    validate_range(payload.start_date, payload.end_date)?;

    let total_days = inclusive_days(payload.start_date, payload.end_date);
    let paid = is_paid(payload.holiday_type);

    let result = sqlx::query(
        "INSERT INTO office_holidays \
         (company_id, title, start_date, end_date, holiday_type, is_paid, total_days, description) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(auth.company_id)
    .bind(&payload.title)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.holiday_type.to_string())
    .bind(paid)
    .bind(total_days)
    .bind(&payload.description)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        ApiError::db_or_conflict(
            "insert holiday",
            "Holiday with this date range already exists",
            e,
        )
    })?;

    let holiday_id = result.last_insert_id();
    propagate(pool.get_ref(), auth.company_id, payload.start_date, payload.end_date).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Holiday created",
        "id": holiday_id,
        "total_days": total_days
    })))
}

/// Two-phase replace: drop the propagated rows of the old range, rewrite the
/// record, re-propagate the new range. Re-running after a partial failure
/// converges.
#[utoipa::path(
    put,
    path = "/api/v1/holidays/{holiday_id}",
    request_body = HolidayPayload,
    params(("holiday_id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday updated and re-propagated"),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Holiday not found"),
        (status = 409, description = "Holiday with this date range already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn update_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<HolidayPayload>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageHolidays, auth.company_id)?;
    let holiday_id = path.into_inner();
    validate_range(payload.start_date, payload.end_date)?;

    let old = fetch_holiday(pool.get_ref(), auth.company_id, holiday_id).await?;

    store::delete_holiday_attendance(pool.get_ref(), auth.company_id, old.start_date, old.end_date)
        .await
        .map_err(|e| ApiError::db("delete propagated holiday rows", e))?;

    let total_days = inclusive_days(payload.start_date, payload.end_date);
    sqlx::query(
        "UPDATE office_holidays SET title = ?, start_date = ?, end_date = ?, holiday_type = ?, \
         is_paid = ?, total_days = ?, description = ? WHERE id = ? AND company_id = ?",
    )
    .bind(&payload.title)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.holiday_type.to_string())
    .bind(is_paid(payload.holiday_type))
    .bind(total_days)
    .bind(&payload.description)
    .bind(holiday_id)
    .bind(auth.company_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        ApiError::db_or_conflict(
            "update holiday",
            "Holiday with this date range already exists",
            e,
        )
    })?;

    propagate(pool.get_ref(), auth.company_id, payload.start_date, payload.end_date).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday updated",
        "total_days": total_days
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/holidays/{holiday_id}",
    params(("holiday_id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday and propagated rows deleted"),
        (status = 404, description = "Holiday not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageHolidays, auth.company_id)?;
    let holiday_id = path.into_inner();

    let holiday = fetch_holiday(pool.get_ref(), auth.company_id, holiday_id).await?;

    let removed = store::delete_holiday_attendance(
        pool.get_ref(),
        auth.company_id,
        holiday.start_date,
        holiday.end_date,
    )
    .await
    .map_err(|e| ApiError::db("delete propagated holiday rows", e))?;

    sqlx::query("DELETE FROM office_holidays WHERE id = ? AND company_id = ?")
        .bind(holiday_id)
        .bind(auth.company_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| ApiError::db("delete holiday", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday deleted",
        "attendance_rows_removed": removed
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/holidays",
    responses(
        (status = 200, description = "Holidays of the company"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let holidays = sqlx::query_as::<_, OfficeHoliday>(
        "SELECT id, company_id, title, start_date, end_date, holiday_type, is_paid, total_days, \
         description FROM office_holidays WHERE company_id = ? ORDER BY start_date",
    )
    .bind(auth.company_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("fetch holidays", e))?;

    Ok(HttpResponse::Ok().json(holidays))
}

async fn fetch_holiday(
    pool: &MySqlPool,
    company_id: u64,
    holiday_id: u64,
) -> Result<OfficeHoliday, ApiError> {
    sqlx::query_as::<_, OfficeHoliday>(
        "SELECT id, company_id, title, start_date, end_date, holiday_type, is_paid, total_days, \
         description FROM office_holidays WHERE id = ? AND company_id = ?",
    )
    .bind(holiday_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| ApiError::db("fetch holiday", e))?
    .ok_or_else(|| ApiError::not_found("Holiday not found"))
}

async fn propagate(
    pool: &MySqlPool,
    company_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), ApiError> {
    let employee_ids = store::list_employee_ids(pool, company_id)
        .await
        .map_err(|e| ApiError::db("list employees", e))?;
    let dates = expand_range(start, end, None);

    store::upsert_holiday_attendance(pool, company_id, &employee_ids, &dates)
        .await
        .map_err(|e| ApiError::db("propagate holiday attendance", e))?;

    tracing::info!(
        company_id,
        employees = employee_ids.len(),
        days = dates.len(),
        "holiday attendance propagated"
    );
    Ok(())
}
