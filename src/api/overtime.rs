use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::audit;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::{
    employee::Employee,
    overtime::{OvertimeEntry, OvertimeType},
    payroll_entry::PayrollEntry,
};
use crate::payroll::reconcile;

#[derive(Deserialize, ToSchema)]
pub struct CreateOvertime {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-03-14", value_type = String, format = "date")]
    pub entry_date: NaiveDate,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = "overtime50")]
    pub kind: OvertimeType,
    #[schema(example = 1.5)]
    pub multiplier: f64,
    #[schema(example = 4.0)]
    pub hours: f64,
    /// Computed by the caller from the hourly wage; stored as-is
    #[schema(example = 750.0)]
    pub amount: f64,
    #[schema(example = "Inventory count", nullable = true)]
    pub description: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct OvertimeQuery {
    #[schema(example = 1)]
    pub employee_id: Option<u64>,
    #[schema(example = 3)]
    pub month: Option<u32>,
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

/// Inserts a ledger entry and increments the matching payroll entry's
/// overtime accumulator in one transaction, so the ledger sum and the
/// accumulator can never diverge through this path.
#[utoipa::path(
    post,
    path = "/api/v1/overtime",
    request_body = CreateOvertime,
    responses(
        (status = 201, body = OvertimeEntry),
        (status = 400, description = "Field out of bounds"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn create_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateOvertime>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    reconcile::validate_period(payload.month, payload.year)?;
    for (field, value) in [
        ("multiplier", payload.multiplier),
        ("hours", payload.hours),
        ("amount", payload.amount),
    ] {
        if value < 0.0 {
            return Err(ApiError::validation(field, format!("{field} cannot be negative")));
        }
    }

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(payload.employee_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::EmployeeNotFound)?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO overtime_entries
        (employee_id, month, year, entry_date, kind, multiplier, hours, amount, description)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.month)
    .bind(payload.year)
    .bind(payload.entry_date)
    .bind(payload.kind)
    .bind(payload.multiplier)
    .bind(payload.hours)
    .bind(payload.amount)
    .bind(&payload.description)
    .execute(&mut *tx)
    .await?;
    let overtime_id = result.last_insert_id();

    let existing = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE employee_id = ? AND month = ? AND year = ? FOR UPDATE",
    )
    .bind(payload.employee_id)
    .bind(payload.month)
    .bind(payload.year)
    .fetch_optional(&mut *tx)
    .await?;

    let before = existing
        .as_ref()
        .map(|e| serde_json::to_value(e).unwrap_or(Value::Null))
        .unwrap_or(Value::Null);

    let entry_id = match existing {
        Some(entry) => {
            let sql = match payload.kind {
                OvertimeType::Overtime50 => {
                    "UPDATE payroll_entries SET overtime50 = overtime50 + ? WHERE id = ?"
                }
                OvertimeType::Overtime100 => {
                    "UPDATE payroll_entries SET overtime100 = overtime100 + ? WHERE id = ?"
                }
            };
            sqlx::query(sql)
                .bind(payload.amount)
                .bind(entry.id)
                .execute(&mut *tx)
                .await?;
            entry.id
        }
        None => {
            let (overtime50, overtime100) = match payload.kind {
                OvertimeType::Overtime50 => (payload.amount, 0.0),
                OvertimeType::Overtime100 => (0.0, payload.amount),
            };
            let result = sqlx::query(
                r#"
                INSERT INTO payroll_entries
                (employee_id, month, year, days_worked, advance, official_advance,
                 overtime50, overtime100, official_payment, cash_payment, sort_order)
                VALUES (?, ?, ?, ?, 0, 0, ?, ?, 0, 0, 0)
                "#,
            )
            .bind(payload.employee_id)
            .bind(payload.month)
            .bind(payload.year)
            .bind(employee.working_days_base)
            .bind(overtime50)
            .bind(overtime100)
            .execute(&mut *tx)
            .await?;
            result.last_insert_id()
        }
    };

    tx.commit().await?;

    let created = sqlx::query_as::<_, OvertimeEntry>("SELECT * FROM overtime_entries WHERE id = ?")
        .bind(overtime_id)
        .fetch_one(pool.get_ref())
        .await?;
    let entry_after = sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = ?")
        .bind(entry_id)
        .fetch_one(pool.get_ref())
        .await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "overtime_entry",
        overtime_id,
        Value::Null,
        serde_json::to_value(&created).unwrap_or(Value::Null),
    );
    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "payroll_entry",
        entry_id,
        before,
        serde_json::to_value(&entry_after).unwrap_or(Value::Null),
    );

    Ok(HttpResponse::Created().json(created))
}

/// Deletes a ledger entry and decrements the matching accumulator in one
/// transaction. The decrement floors at zero: manual edits to the payroll
/// entry's overtime fields can leave the accumulator below the ledger sum,
/// and drift is reconciled downward rather than allowed to go negative.
#[utoipa::path(
    delete,
    path = "/api/v1/overtime/{overtime_id}",
    params(("overtime_id", description = "Overtime entry ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Overtime entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn delete_overtime(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    let overtime_id = path.into_inner();
    let entry = sqlx::query_as::<_, OvertimeEntry>("SELECT * FROM overtime_entries WHERE id = ?")
        .bind(overtime_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("overtime entry"))?;

    let pay_before = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE employee_id = ? AND month = ? AND year = ?",
    )
    .bind(entry.employee_id)
    .bind(entry.month)
    .bind(entry.year)
    .fetch_optional(pool.get_ref())
    .await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM overtime_entries WHERE id = ?")
        .bind(overtime_id)
        .execute(&mut *tx)
        .await?;

    let sql = match entry.kind {
        OvertimeType::Overtime50 => {
            "UPDATE payroll_entries SET overtime50 = GREATEST(overtime50 - ?, 0) \
             WHERE employee_id = ? AND month = ? AND year = ?"
        }
        OvertimeType::Overtime100 => {
            "UPDATE payroll_entries SET overtime100 = GREATEST(overtime100 - ?, 0) \
             WHERE employee_id = ? AND month = ? AND year = ?"
        }
    };
    sqlx::query(sql)
        .bind(entry.amount)
        .bind(entry.employee_id)
        .bind(entry.month)
        .bind(entry.year)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "overtime_entry",
        overtime_id,
        serde_json::to_value(&entry).unwrap_or(Value::Null),
        Value::Null,
    );

    if let Some(pay_before) = pay_before {
        let pay_after =
            sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = ?")
                .bind(pay_before.id)
                .fetch_one(pool.get_ref())
                .await?;
        audit::record(
            pool.get_ref().clone(),
            auth.user_id,
            "payroll_entry",
            pay_before.id,
            serde_json::to_value(&pay_before).unwrap_or(Value::Null),
            serde_json::to_value(&pay_after).unwrap_or(Value::Null),
        );
    }

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/overtime",
    params(OvertimeQuery),
    responses(
        (status = 200, body = [OvertimeEntry])
    ),
    security(("bearer_auth" = [])),
    tag = "Overtime"
)]
pub async fn list_overtime(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<OvertimeQuery>,
) -> Result<HttpResponse, ApiError> {
    if let (Some(month), Some(year)) = (query.month, query.year) {
        reconcile::validate_period(month, year)?;
    }

    let mut conditions = Vec::new();
    if query.employee_id.is_some() {
        conditions.push("employee_id = ?");
    }
    if query.month.is_some() {
        conditions.push("month = ?");
    }
    if query.year.is_some() {
        conditions.push("year = ?");
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        "SELECT * FROM overtime_entries {} ORDER BY entry_date DESC, id DESC",
        where_clause
    );

    let mut q = sqlx::query_as::<_, OvertimeEntry>(&sql);
    if let Some(employee_id) = query.employee_id {
        q = q.bind(employee_id);
    }
    if let Some(month) = query.month {
        q = q.bind(month);
    }
    if let Some(year) = query.year {
        q = q.bind(year);
    }

    let entries = q.fetch_all(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(entries))
}
