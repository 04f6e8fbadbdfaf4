use actix_web::{HttpResponse, Responder, web};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::engine::policy::Action;
use crate::error::ApiError;
use crate::store;
use crate::utils::db_utils::{build_update_sql, execute_update};

/// Company settings: shift defaults and the timezone offset the engine
/// applies at its UTC boundary.
#[utoipa::path(
    get,
    path = "/api/v1/company",
    responses(
        (status = 200, description = "Company settings"),
        (status = 404, description = "Company not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn get_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let company = store::fetch_company(pool.get_ref(), auth.company_id)
        .await
        .map_err(|e| ApiError::db("fetch company", e))?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    Ok(HttpResponse::Ok().json(company))
}

/// Owner-only partial update of company settings.
#[utoipa::path(
    put,
    path = "/api/v1/company",
    request_body = Object,
    responses(
        (status = 200, description = "Company updated"),
        (status = 404, description = "Company not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn update_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageCompany, auth.company_id)?;

    let update = build_update_sql("companies", &body, auth.company_id, None)?;
    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| ApiError::db("update company", e))?;

    if affected == 0 {
        return Err(ApiError::not_found("Company not found"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Company updated"
    })))
}
