use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::engine::policy::Action;
use crate::error::ApiError;
use crate::model::leave::{LeaveStatus, LeaveType};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2025-03-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-03-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2025-03-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-03-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick", value_type = String)]
    pub leave_type: String,
    #[schema(example = "pending", value_type = String)]
    pub status: Option<String>,
    #[schema(example = "2025-03-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::RequestLeave, auth.company_id)?;
    let employee_id = auth.require_employee()?;

    if payload.start_date > payload.end_date {
        return Err(ApiError::invalid("start_date cannot be after end_date"));
    }

    sqlx::query(
        "INSERT INTO leaves (company_id, employee_id, start_date, end_date, leave_type, status) \
         VALUES (?, ?, ?, ?, ?, 'pending')",
    )
    .bind(auth.company_id)
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("insert leave", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leaves/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 404, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::DecideLeave, auth.company_id)?;
    decide_leave(
        pool.get_ref(),
        auth.company_id,
        path.into_inner(),
        LeaveStatus::Approved,
    )
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Leave approved" })))
}

/* =========================
Reject leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leaves/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 404, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::DecideLeave, auth.company_id)?;
    decide_leave(
        pool.get_ref(),
        auth.company_id,
        path.into_inner(),
        LeaveStatus::Rejected,
    )
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Leave rejected" })))
}

/// Pending-only transition: a decided leave cannot be re-decided.
async fn decide_leave(
    pool: &MySqlPool,
    company_id: u64,
    leave_id: u64,
    verdict: LeaveStatus,
) -> Result<(), ApiError> {
    let result = sqlx::query(
        "UPDATE leaves SET status = ? WHERE id = ? AND company_id = ? AND status = 'pending'",
    )
    .bind(verdict.to_string())
    .bind(leave_id)
    .bind(company_id)
    .execute(pool)
    .await
    .map_err(|e| ApiError::db("decide leave", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            "Leave request not found or already processed",
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::DecideLeave, auth.company_id)?;
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveResponse>(
        "SELECT id, employee_id, start_date, end_date, leave_type, status, created_at \
         FROM leaves WHERE id = ? AND company_id = ?",
    )
    .bind(leave_id)
    .bind(auth.company_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("fetch leave", e))?
    .ok_or_else(|| ApiError::not_found("Leave request not found"))?;

    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/v1/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::DecideLeave, auth.company_id)?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE company_id = ?");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leaves{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(auth.company_id);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| ApiError::db("count leaves", e))?;

    let data_sql = format!(
        "SELECT id, employee_id, start_date, end_date, leave_type, status, created_at \
         FROM leaves{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveResponse>(&data_sql).bind(auth.company_id);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| ApiError::db("fetch leave list", e))?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
