use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::audit;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::employee::Employee;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "Ayhan")]
    pub first_name: String,
    #[schema(example = "Demir")]
    pub last_name: String,
    #[schema(example = 30000.0)]
    pub salary: f64,
    /// Defaults to 30 when omitted
    #[schema(example = 30)]
    pub working_days_base: Option<i32>,
    #[schema(example = true)]
    pub is_insured: bool,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-30", format = "date", value_type = String, nullable = true)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub employee_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = 32000.0)]
    pub salary: Option<f64>,
    #[schema(example = 30)]
    pub working_days_base: Option<i32>,
    pub is_insured: Option<bool>,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub start_date: Option<NaiveDate>,
    /// Send to soft-exclude the employee from later periods; null clears it
    #[schema(example = "2026-06-30", format = "date", value_type = String, nullable = true)]
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub end_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an omitted field (outer None) from an explicit null
/// (Some(None)) so PUT can clear end_date.
fn deserialize_explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub is_insured: Option<bool>,
    /// When true, only employees without a past end date
    pub active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

fn validate_identity(salary: f64, working_days_base: i32) -> Result<(), ApiError> {
    if salary <= 0.0 {
        return Err(ApiError::validation("salary", "salary must be positive"));
    }
    if !(1..=31).contains(&working_days_base) {
        return Err(ApiError::validation(
            "working_days_base",
            "working days base must be between 1 and 31",
        ));
    }
    Ok(())
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Field out of bounds")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    let working_days_base = payload.working_days_base.unwrap_or(30);
    validate_identity(payload.salary, working_days_base)?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, first_name, last_name, salary, working_days_base, is_insured, start_date, end_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(payload.salary)
    .bind(working_days_base)
    .bind(payload.is_insured)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .execute(pool.get_ref())
    .await?;

    let created = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "employee",
        created.id,
        Value::Null,
        serde_json::to_value(&created).unwrap_or(Value::Null),
    );

    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    if query.is_insured.is_some() {
        conditions.push("is_insured = ?");
    }
    if query.active == Some(true) {
        conditions.push("(end_date IS NULL OR end_date >= ?)");
    }
    let like = query.search.as_ref().map(|s| format!("%{}%", s));
    if like.is_some() {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR employee_code LIKE ?)");
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let today = Utc::now().date_naive();

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(insured) = query.is_insured {
        count_query = count_query.bind(insured);
    }
    if query.active == Some(true) {
        count_query = count_query.bind(today);
    }
    if let Some(like) = &like {
        count_query = count_query.bind(like).bind(like).bind(like);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    if let Some(insured) = query.is_insured {
        data_query = data_query.bind(insured);
    }
    if query.active == Some(true) {
        data_query = data_query.bind(today);
    }
    if let Some(like) = &like {
        data_query = data_query.bind(like).bind(like).bind(like);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(path.into_inner())
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::EmployeeNotFound)?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Field out of bounds"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    let employee_id = path.into_inner();
    let current = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::EmployeeNotFound)?;

    let salary = body.salary.unwrap_or(current.salary);
    let working_days_base = body.working_days_base.unwrap_or(current.working_days_base);
    validate_identity(salary, working_days_base)?;

    let end_date = match body.end_date {
        Some(value) => value,
        None => current.end_date,
    };

    sqlx::query(
        r#"
        UPDATE employees
        SET employee_code = ?, first_name = ?, last_name = ?, salary = ?,
            working_days_base = ?, is_insured = ?, start_date = ?, end_date = ?
        WHERE id = ?
        "#,
    )
    .bind(body.employee_code.as_ref().unwrap_or(&current.employee_code))
    .bind(body.first_name.as_ref().unwrap_or(&current.first_name))
    .bind(body.last_name.as_ref().unwrap_or(&current.last_name))
    .bind(salary)
    .bind(working_days_base)
    .bind(body.is_insured.unwrap_or(current.is_insured))
    .bind(body.start_date.unwrap_or(current.start_date))
    .bind(end_date)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    let updated = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_one(pool.get_ref())
        .await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "employee",
        employee_id,
        serde_json::to_value(&current).unwrap_or(Value::Null),
        serde_json::to_value(&updated).unwrap_or(Value::Null),
    );

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let employee_id = path.into_inner();
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::EmployeeNotFound);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully deleted"
    })))
}
