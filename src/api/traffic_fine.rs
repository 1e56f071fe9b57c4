use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::audit;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::traffic_fine::{TrafficFine, TrafficFinePayment};

#[derive(Deserialize, ToSchema)]
pub struct CreateTrafficFine {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub fine_date: NaiveDate,
    #[schema(example = 2500.0)]
    pub amount: f64,
    #[schema(example = "Speeding, company van", nullable = true)]
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFinePayment {
    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    pub payment_date: NaiveDate,
    #[schema(example = 500.0)]
    pub amount: f64,
}

/// A fine with its payment total folded in. `remaining` is derived on read
/// and never stored.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct TrafficFineSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub fine_date: NaiveDate,
    #[schema(example = 2500.0)]
    pub amount: f64,
    #[schema(example = "Speeding, company van", nullable = true)]
    pub description: Option<String>,
    #[schema(example = 500.0)]
    pub paid: f64,
    #[schema(example = 2000.0)]
    pub remaining: f64,
}

#[derive(Serialize, ToSchema)]
pub struct TrafficFineDetail {
    #[serde(flatten)]
    pub summary: TrafficFineSummary,
    pub payments: Vec<TrafficFinePayment>,
}

const SUMMARY_SQL: &str = r#"
    SELECT f.id, f.employee_id, f.fine_date, f.amount, f.description,
           COALESCE(SUM(p.amount), 0) AS paid,
           f.amount - COALESCE(SUM(p.amount), 0) AS remaining
    FROM traffic_fines f
    LEFT JOIN traffic_fine_payments p ON p.fine_id = f.id
"#;

/// Record Traffic Fine
#[utoipa::path(
    post,
    path = "/api/v1/fines",
    request_body = CreateTrafficFine,
    responses(
        (status = 201, description = "Fine recorded", body = TrafficFine),
        (status = 400, description = "Field out of bounds"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "TrafficFine"
)]
pub async fn create_fine(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTrafficFine>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    if payload.amount <= 0.0 {
        return Err(ApiError::validation("amount", "fine amount must be positive"));
    }

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
        .bind(payload.employee_id)
        .fetch_one(pool.get_ref())
        .await?;
    if exists == 0 {
        return Err(ApiError::EmployeeNotFound);
    }

    let result = sqlx::query(
        "INSERT INTO traffic_fines (employee_id, fine_date, amount, description) VALUES (?, ?, ?, ?)",
    )
    .bind(payload.employee_id)
    .bind(payload.fine_date)
    .bind(payload.amount)
    .bind(&payload.description)
    .execute(pool.get_ref())
    .await?;

    let created = sqlx::query_as::<_, TrafficFine>("SELECT * FROM traffic_fines WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "traffic_fine",
        created.id,
        Value::Null,
        serde_json::to_value(&created).unwrap_or(Value::Null),
    );

    Ok(HttpResponse::Created().json(created))
}

/// List Fines for an Employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/fines",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Fines with paid and remaining totals", body = [TrafficFineSummary]),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "TrafficFine"
)]
pub async fn list_employee_fines(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_one(pool.get_ref())
        .await?;
    if exists == 0 {
        return Err(ApiError::EmployeeNotFound);
    }

    let sql = format!(
        "{SUMMARY_SQL} WHERE f.employee_id = ? GROUP BY f.id ORDER BY f.fine_date DESC, f.id DESC"
    );
    let fines = sqlx::query_as::<_, TrafficFineSummary>(&sql)
        .bind(employee_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(fines))
}

/// Get Fine with Payments
#[utoipa::path(
    get,
    path = "/api/v1/fines/{fine_id}",
    params(("fine_id", description = "Traffic fine ID")),
    responses(
        (status = 200, description = "Fine with its payment history", body = TrafficFineDetail),
        (status = 404, description = "Fine not found")
    ),
    security(("bearer_auth" = [])),
    tag = "TrafficFine"
)]
pub async fn get_fine(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let fine_id = path.into_inner();

    let sql = format!("{SUMMARY_SQL} WHERE f.id = ? GROUP BY f.id");
    let summary = sqlx::query_as::<_, TrafficFineSummary>(&sql)
        .bind(fine_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("traffic fine"))?;

    let payments = sqlx::query_as::<_, TrafficFinePayment>(
        "SELECT * FROM traffic_fine_payments WHERE fine_id = ? ORDER BY payment_date, id",
    )
    .bind(fine_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(TrafficFineDetail { summary, payments }))
}

/// Record Fine Payment
///
/// Partial payments are allowed and may overshoot the fine amount; the
/// remaining balance simply goes negative in that case and the caller is
/// expected to correct the books.
#[utoipa::path(
    post,
    path = "/api/v1/fines/{fine_id}/payments",
    params(("fine_id", description = "Traffic fine ID")),
    request_body = CreateFinePayment,
    responses(
        (status = 201, description = "Payment recorded", body = TrafficFinePayment),
        (status = 400, description = "Field out of bounds"),
        (status = 404, description = "Fine not found")
    ),
    security(("bearer_auth" = [])),
    tag = "TrafficFine"
)]
pub async fn create_fine_payment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateFinePayment>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    if payload.amount <= 0.0 {
        return Err(ApiError::validation("amount", "payment amount must be positive"));
    }

    let fine_id = path.into_inner();
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM traffic_fines WHERE id = ?")
        .bind(fine_id)
        .fetch_one(pool.get_ref())
        .await?;
    if exists == 0 {
        return Err(ApiError::NotFound("traffic fine"));
    }

    let result = sqlx::query(
        "INSERT INTO traffic_fine_payments (fine_id, payment_date, amount) VALUES (?, ?, ?)",
    )
    .bind(fine_id)
    .bind(payload.payment_date)
    .bind(payload.amount)
    .execute(pool.get_ref())
    .await?;

    let created =
        sqlx::query_as::<_, TrafficFinePayment>("SELECT * FROM traffic_fine_payments WHERE id = ?")
            .bind(result.last_insert_id())
            .fetch_one(pool.get_ref())
            .await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "traffic_fine_payment",
        created.id,
        Value::Null,
        serde_json::to_value(&created).unwrap_or(Value::Null),
    );

    Ok(HttpResponse::Created().json(created))
}

/// Delete Fine Payment
#[utoipa::path(
    delete,
    path = "/api/v1/fines/payments/{payment_id}",
    params(("payment_id", description = "Fine payment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "TrafficFine"
)]
pub async fn delete_fine_payment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    let payment_id = path.into_inner();
    let payment =
        sqlx::query_as::<_, TrafficFinePayment>("SELECT * FROM traffic_fine_payments WHERE id = ?")
            .bind(payment_id)
            .fetch_optional(pool.get_ref())
            .await?
            .ok_or(ApiError::NotFound("fine payment"))?;

    sqlx::query("DELETE FROM traffic_fine_payments WHERE id = ?")
        .bind(payment_id)
        .execute(pool.get_ref())
        .await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "traffic_fine_payment",
        payment_id,
        serde_json::to_value(&payment).unwrap_or(Value::Null),
        Value::Null,
    );

    Ok(HttpResponse::NoContent().finish())
}
