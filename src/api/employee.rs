use crate::{
    auth::auth::AuthUser,
    engine::policy::Action,
    error::ApiError,
    model::employee::Employee,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-3000", value_type = String)]
    pub employee_code: String,
    #[schema(example = "John", value_type = String)]
    pub first_name: String,
    #[schema(example = "Doe", value_type = String)]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = 50000.0)]
    pub base_salary: f64,
    #[schema(example = "2025-01-01", format = "date", value_type = String)]
    pub hire_date: chrono::NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Object, example = json!({
            "message": "Employee created successfully",
            "id": 1001
        })),
        (status = 409, description = "Employee code already in use"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageEmployees, auth.company_id)?;

    let result = sqlx::query(
        "INSERT INTO employees \
         (company_id, employee_code, first_name, last_name, email, phone, base_salary, hire_date, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active')",
    )
    .bind(auth.company_id)
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(payload.base_salary)
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| ApiError::db_or_conflict("insert employee", "Employee code already in use", e))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Employee created successfully",
        "id": result.last_insert_id()
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("page",  Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ViewEmployees, auth.company_id)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    debug!(page, per_page, offset, "Fetching employees");

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE company_id = ?")
            .bind(auth.company_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| ApiError::db("count employees", e))?;

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT id, company_id, employee_code, first_name, last_name, email, phone, base_salary, \
         hire_date, status FROM employees WHERE company_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
    )
    .bind(auth.company_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| ApiError::db("fetch employees", e))?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Update Employee: partial JSON patch, columns whitelisted by the update
/// builder, scoped to the caller's tenant.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageEmployees, auth.company_id)?;
    let employee_id = path.into_inner();

    let update = build_update_sql("employees", &body, employee_id, Some(auth.company_id))?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| ApiError::db("update employee", e))?;

    if affected == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee. Payroll rows cascade with the employee; attendance and
/// leave history stay for audit.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.authorize(Action::ManageEmployees, auth.company_id)?;
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ? AND company_id = ?")
        .bind(employee_id)
        .bind(auth.company_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| ApiError::db("delete employee", e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Employee not found"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully deleted"
    })))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();
    if auth.employee_id != Some(employee_id) {
        auth.authorize(Action::ViewEmployees, auth.company_id)?;
    }

    let employee = crate::store::fetch_employee(pool.get_ref(), auth.company_id, employee_id)
        .await
        .map_err(|e| ApiError::db("fetch employee", e))?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    Ok(HttpResponse::Ok().json(employee))
}
