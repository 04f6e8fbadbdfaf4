use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::engine::holiday::expand_range;
use crate::engine::payroll::{
    AttendanceDay, LeaveSpan, MonthWindow, MonthlyPayroll, PayrollInputs, compute, net_payable,
};
use crate::engine::policy::Action;
use crate::engine::schedule::resolve;
use crate::engine::time::today_in_company;
use crate::error::ApiError;
use crate::model::attendance::AttendanceStatus;
use crate::model::employee::Employee;
use crate::model::leave::LeaveType;
use crate::model::payroll::Payroll;
use crate::store;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ComputeQuery {
    #[schema(example = 1001)]
    pub employee_id: u64,
    /// Month label, e.g. "March 2025"
    #[schema(example = "March 2025")]
    pub month: String,
}

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "March 2025")]
    pub month: String,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollQueryResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollFilter {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

/// Fetches everything the aggregator needs and runs the month walk.
async fn build_monthly(
    pool: &MySqlPool,
    company_id: u64,
    employee_id: u64,
    month_label: &str,
) -> Result<(Employee, MonthWindow, MonthlyPayroll), ApiError> {
    let company = store::fetch_company(pool, company_id)
        .await
        .map_err(|e| ApiError::db("fetch company", e))?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    let employee = store::fetch_employee(pool, company_id, employee_id)
        .await
        .map_err(|e| ApiError::db("fetch employee", e))?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    let window = MonthWindow::parse(month_label)?;
    let today = today_in_company(Utc::now(), company.tz_offset_minutes);

    let Some(end) = window.effective_end(today) else {
        // month not started: empty ledger, zeroed summary
        let empty = MonthlyPayroll {
            summary: Default::default(),
            ledger: Vec::new(),
        };
        return Ok((employee, window, empty));
    };

    let offset = company.tz_offset_minutes as i64;
    let mut attendance: HashMap<NaiveDate, AttendanceDay> = HashMap::new();
    for row in store::fetch_attendance_range(pool, company_id, employee_id, window.start, end)
        .await
        .map_err(|e| ApiError::db("fetch attendance range", e))?
    {
        let status =
            AttendanceStatus::from_str(&row.status).unwrap_or(AttendanceStatus::Absent);
        attendance.insert(
            row.date,
            AttendanceDay {
                status,
                check_in: row.check_in.map(|t| t + Duration::minutes(offset)),
                check_out: row.check_out.map(|t| t + Duration::minutes(offset)),
                total_hours: row.total_hours,
                overtime_hours: row.overtime_hours,
            },
        );
    }

    let leaves: Vec<LeaveSpan> =
        store::fetch_approved_leaves_overlapping(pool, company_id, employee_id, window.start, end)
            .await
            .map_err(|e| ApiError::db("fetch approved leaves", e))?
            .into_iter()
            .map(|l| LeaveSpan {
                start: l.start_date,
                end: l.end_date,
                paid: LeaveType::from_str(&l.leave_type)
                    .map(|t| t.is_paid())
                    .unwrap_or(false),
            })
            .collect();

    let mut holidays: HashSet<NaiveDate> = HashSet::new();
    for h in store::fetch_holidays_overlapping(pool, company_id, window.start, end)
        .await
        .map_err(|e| ApiError::db("fetch holidays", e))?
    {
        holidays.extend(expand_range(h.start_date, h.end_date, Some(end)));
    }

    let active = store::fetch_active_schedule(pool, company_id, employee_id)
        .await
        .map_err(|e| ApiError::db("fetch schedule", e))?;
    let resolved = resolve(active.as_ref(), Some(&company));

    let inputs = PayrollInputs {
        holidays: &holidays,
        leaves: &leaves,
        weekly_off: &resolved.weekly_off,
        attendance: &attendance,
    };

    let monthly = compute(
        &employee.employee_code,
        &employee.full_name(),
        &window,
        end,
        &inputs,
    );

    Ok((employee, window, monthly))
}

/// Computes the month on the fly: summary plus the per-day ledger the
/// CSV/PDF export consumes. Employees may compute their own; payroll
/// viewers anyone's.
#[utoipa::path(
    get,
    path = "/api/v1/payroll/compute",
    params(ComputeQuery),
    responses(
        (status = 200, description = "Summary and per-day ledger", body = Object),
        (status = 400, description = "Invalid month label"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn compute_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ComputeQuery>,
) -> Result<impl Responder, ApiError> {
    if auth.employee_id != Some(query.employee_id) {
        auth.authorize(Action::ViewPayroll, auth.company_id)?;
    }

    let (_, _, monthly) =
        build_monthly(pool.get_ref(), auth.company_id, query.employee_id, &query.month).await?;

    Ok(HttpResponse::Ok().json(monthly))
}

/// Runs the aggregator and upserts the summary keyed (employee, month):
/// re-generating a month overwrites the previous run.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 200, description = "Payroll generated", body = Object, example = json!({
            "message": "Payroll generated",
            "month": "2025-03-01",
            "net_payable": 19354.84
        })),
        (status = 400, description = "Invalid month label"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayroll>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::RunPayroll, auth.company_id)?;

    let (employee, window, monthly) =
        build_monthly(pool.get_ref(), auth.company_id, payload.employee_id, &payload.month)
            .await?;

    let net = net_payable(
        employee.base_salary,
        monthly.summary.total_working_days,
        window.days_in_month(),
    );

    store::upsert_payroll(
        pool.get_ref(),
        auth.company_id,
        employee.id,
        window.start,
        &monthly.summary,
        employee.base_salary,
        net,
    )
    .await
    .map_err(|e| ApiError::db("upsert payroll", e))?;

    tracing::info!(
        employee_id = employee.id,
        month = %window.start,
        net_payable = net,
        "payroll generated"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Payroll generated",
        "month": window.start.to_string(),
        "summary": monthly.summary,
        "net_payable": net
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id" = u64, Path, description = "Payroll ID")),
    responses(
        (status = 200, body = Payroll),
        (status = 404, description = "Payroll not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let payroll_id = path.into_inner();

    let payroll = sqlx::query_as::<_, Payroll>(
        "SELECT id, company_id, employee_id, month, present_days, paid_leaves, unpaid_leaves, \
         office_holidays, weekly_offs, missing_days, overtime_hours, total_working_days, \
         base_salary, net_payable FROM payroll WHERE id = ? AND company_id = ?",
    )
    .bind(payroll_id)
    .bind(auth.company_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("fetch payroll", e))?
    .ok_or_else(|| ApiError::not_found("Payroll not found"))?;

    if auth.employee_id != Some(payroll.employee_id) {
        auth.authorize(Action::ViewPayroll, auth.company_id)?;
    }

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollFilter),
    responses(
        (status = 200, body = PayrollQueryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollFilter>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ViewPayroll, auth.company_id)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (count_sql, data_sql) = if query.employee_id.is_some() {
        (
            "SELECT COUNT(*) FROM payroll WHERE company_id = ? AND employee_id = ?",
            "SELECT id, company_id, employee_id, month, present_days, paid_leaves, unpaid_leaves, \
             office_holidays, weekly_offs, missing_days, overtime_hours, total_working_days, \
             base_salary, net_payable FROM payroll WHERE company_id = ? AND employee_id = ? \
             ORDER BY month DESC LIMIT ? OFFSET ?",
        )
    } else {
        (
            "SELECT COUNT(*) FROM payroll WHERE company_id = ?",
            "SELECT id, company_id, employee_id, month, present_days, paid_leaves, unpaid_leaves, \
             office_holidays, weekly_offs, missing_days, overtime_hours, total_working_days, \
             base_salary, net_payable FROM payroll WHERE company_id = ? \
             ORDER BY month DESC LIMIT ? OFFSET ?",
        )
    };

    let mut count_q = sqlx::query_scalar::<_, i64>(count_sql).bind(auth.company_id);
    if let Some(emp) = query.employee_id {
        count_q = count_q.bind(emp);
    }
    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| ApiError::db("count payrolls", e))?;

    let mut data_q = sqlx::query_as::<_, Payroll>(data_sql).bind(auth.company_id);
    if let Some(emp) = query.employee_id {
        data_q = data_q.bind(emp);
    }
    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| ApiError::db("fetch payroll list", e))?;

    Ok(HttpResponse::Ok().json(PayrollQueryResponse {
        data,
        page,
        per_page,
        total,
    }))
}
