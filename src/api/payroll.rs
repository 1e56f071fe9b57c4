use std::collections::{HashMap, HashSet};

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::audit;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::{employee::Employee, payroll_entry::PayrollEntry};
use crate::payroll::{
    calc,
    reconcile::{self, EntryPatch, MergedEntry},
    split::{SplitPolicy, compute_split},
};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

/// Entry with every derived field recomputed from the employee's current
/// salary/working-days base at read time. The stored payment pair is only a
/// cache; this view is the authoritative presentation.
#[derive(Serialize, ToSchema)]
pub struct PayrollEntryView {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "Ayhan Demir")]
    pub employee_name: String,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = true)]
    pub is_insured: bool,
    #[schema(example = 30)]
    pub days_worked: i32,
    #[schema(example = 1000.0)]
    pub daily_wage: f64,
    #[schema(example = 30000.0)]
    pub earned_salary: f64,
    #[schema(example = 0.0)]
    pub overtime50: f64,
    #[schema(example = 0.0)]
    pub overtime100: f64,
    #[schema(example = 0.0)]
    pub advance: f64,
    #[schema(example = 0.0)]
    pub official_advance: f64,
    #[schema(example = 28075.0)]
    pub official_payment: f64,
    #[schema(example = 1925.0)]
    pub cash_payment: f64,
    #[schema(example = 30000.0)]
    pub total_receivable: f64,
    #[schema(example = 0)]
    pub sort_order: i32,
}

impl PayrollEntryView {
    pub fn build(
        policy: &SplitPolicy,
        employee: &Employee,
        entry: &PayrollEntry,
    ) -> Result<Self, ApiError> {
        let daily_wage = calc::daily_wage(employee.salary, employee.working_days_base)?;
        let earned_salary = calc::earned_salary(daily_wage, entry.days_worked)?;

        let merged = MergedEntry {
            days_worked: entry.days_worked,
            advance: entry.advance,
            official_advance: entry.official_advance,
            overtime50: entry.overtime50,
            overtime100: entry.overtime100,
            sort_order: entry.sort_order,
        };
        let split = compute_split(policy, &reconcile::split_input(employee, &merged))?;

        // Both advances come out of the single receivable figure; the channel
        // payments are an allocation of it and are not deducted again.
        let total_receivable = calc::total_receivable(
            earned_salary,
            entry.overtime50,
            entry.overtime100,
            split.advance + split.official_advance,
        )?;

        Ok(PayrollEntryView {
            id: entry.id,
            employee_id: entry.employee_id,
            employee_name: employee.full_name(),
            month: entry.month,
            year: entry.year,
            is_insured: employee.is_insured,
            days_worked: entry.days_worked,
            daily_wage,
            earned_salary,
            overtime50: entry.overtime50,
            overtime100: entry.overtime100,
            advance: split.advance,
            official_advance: split.official_advance,
            official_payment: split.official_payment,
            cash_payment: split.cash_payment,
            total_receivable,
            sort_order: entry.sort_order,
        })
    }
}

async fn fetch_entry(pool: &MySqlPool, id: u64) -> Result<PayrollEntry, ApiError> {
    sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("payroll entry"))
}

async fn fetch_employee(pool: &MySqlPool, id: u64) -> Result<Employee, ApiError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::EmployeeNotFound)
}

/// Period view. Side effect: auto-creates a zero-valued entry for every
/// active employee that has none yet, so the caller always sees exactly one
/// row per active employee.
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PeriodQuery),
    responses(
        (status = 200, description = "One entry per active employee", body = [PayrollEntryView]),
        (status = 400, description = "Invalid period"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_period_entries(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    reconcile::validate_period(query.month, query.year)?;

    // Active set: no end date, or an end date within/after the period.
    let employees: Vec<Employee> = sqlx::query_as::<_, Employee>("SELECT * FROM employees")
        .fetch_all(pool.get_ref())
        .await?
        .into_iter()
        .filter(|e| reconcile::active_for_period(e.end_date, query.month, query.year))
        .collect();

    let existing = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE month = ? AND year = ?",
    )
    .bind(query.month)
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await?;

    let have: HashSet<u64> = existing.iter().map(|e| e.employee_id).collect();

    for employee in employees.iter().filter(|e| !have.contains(&e.id)) {
        debug!(employee_id = employee.id, month = query.month, year = query.year, "Auto-creating payroll entry");
        // A new period starts fully worked by default. IGNORE: a concurrent
        // first read of the same period may have taken the unique
        // (employee_id, month, year) slot already; the refetch below picks
        // up whichever insert won.
        sqlx::query(
            r#"
            INSERT IGNORE INTO payroll_entries
            (employee_id, month, year, days_worked, advance, official_advance,
             overtime50, overtime100, official_payment, cash_payment, sort_order)
            VALUES (?, ?, ?, ?, 0, 0, 0, 0, 0, 0, 0)
            "#,
        )
        .bind(employee.id)
        .bind(query.month)
        .bind(query.year)
        .bind(employee.working_days_base)
        .execute(pool.get_ref())
        .await?;
    }

    let entries = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE month = ? AND year = ?",
    )
    .bind(query.month)
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await?;

    let by_id: HashMap<u64, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
    let policy = config.split_policy();

    let mut views = Vec::with_capacity(entries.len());
    for entry in &entries {
        // Entries of employees who left before the period are filtered out.
        let Some(employee) = by_id.get(&entry.employee_id) else {
            continue;
        };
        views.push(PayrollEntryView::build(&policy, employee, entry)?);
    }
    views.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });

    Ok(HttpResponse::Ok().json(views))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/{entry_id}",
    params(("entry_id", description = "Payroll entry ID")),
    responses(
        (status = 200, body = PayrollEntryView),
        (status = 404, description = "Payroll entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_entry(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let entry = fetch_entry(pool.get_ref(), path.into_inner()).await?;
    let employee = fetch_employee(pool.get_ref(), entry.employee_id).await?;
    let view = PayrollEntryView::build(&config.split_policy(), &employee, &entry)?;
    Ok(HttpResponse::Ok().json(view))
}

/// Single-entry update. Advances are re-clamped against bases recomputed from
/// the merged values before anything is persisted.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{entry_id}",
    params(("entry_id", description = "Payroll entry ID")),
    request_body = EntryPatch,
    responses(
        (status = 200, body = PayrollEntryView),
        (status = 400, description = "Field out of bounds"),
        (status = 404, description = "Payroll entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<EntryPatch>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    let patch = body.into_inner();
    patch.validate()?;

    let entry_id = path.into_inner();
    let entry = fetch_entry(pool.get_ref(), entry_id).await?;
    let employee = fetch_employee(pool.get_ref(), entry.employee_id).await?;

    let policy = config.split_policy();
    let merged = reconcile::merge(&entry, &patch);
    let split = compute_split(&policy, &reconcile::split_input(&employee, &merged))?;

    sqlx::query(
        r#"
        UPDATE payroll_entries
        SET days_worked = ?, advance = ?, official_advance = ?,
            overtime50 = ?, overtime100 = ?,
            official_payment = ?, cash_payment = ?, sort_order = ?
        WHERE id = ?
        "#,
    )
    .bind(merged.days_worked)
    .bind(split.advance)
    .bind(split.official_advance)
    .bind(merged.overtime50)
    .bind(merged.overtime100)
    .bind(split.official_payment)
    .bind(split.cash_payment)
    .bind(merged.sort_order)
    .bind(entry_id)
    .execute(pool.get_ref())
    .await?;

    let updated = fetch_entry(pool.get_ref(), entry_id).await?;

    audit::record(
        pool.get_ref().clone(),
        auth.user_id,
        "payroll_entry",
        entry_id,
        serde_json::to_value(&entry).unwrap_or(Value::Null),
        serde_json::to_value(&updated).unwrap_or(Value::Null),
    );

    let view = PayrollEntryView::build(&policy, &employee, &updated)?;
    Ok(HttpResponse::Ok().json(view))
}

#[derive(Deserialize, ToSchema)]
pub struct BatchEntryUpdate {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
    pub fields: EntryPatch,
}

/// Batch upsert of per-employee-per-period entries. All-or-nothing: the whole
/// batch runs in one transaction and a missing employee rolls everything
/// back. Items that change neither days worked nor an advance skip the split
/// recomputation.
#[utoipa::path(
    put,
    path = "/api/v1/payroll",
    request_body = [BatchEntryUpdate],
    responses(
        (status = 200, body = [PayrollEntryView]),
        (status = 400, description = "Field out of bounds"),
        (status = 404, description = "Referenced employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn batch_update(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    body: web::Json<Vec<BatchEntryUpdate>>,
) -> Result<HttpResponse, ApiError> {
    auth.require_clerk()?;

    let items = body.into_inner();
    // All validation happens before the first write.
    for item in &items {
        reconcile::validate_period(item.month, item.year)?;
        item.fields.validate()?;
    }

    let policy = config.split_policy();
    let mut tx = pool.begin().await?;
    let mut touched: Vec<(u64, Value)> = Vec::with_capacity(items.len());

    for item in &items {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(item.employee_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ApiError::EmployeeNotFound)?;

        let existing = sqlx::query_as::<_, PayrollEntry>(
            "SELECT * FROM payroll_entries WHERE employee_id = ? AND month = ? AND year = ? FOR UPDATE",
        )
        .bind(item.employee_id)
        .bind(item.month)
        .bind(item.year)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(entry) => {
                let merged = reconcile::merge(&entry, &item.fields);
                let (advance, official_advance, official_payment, cash_payment) =
                    if item.fields.touches_split() {
                        let split =
                            compute_split(&policy, &reconcile::split_input(&employee, &merged))?;
                        (
                            split.advance,
                            split.official_advance,
                            split.official_payment,
                            split.cash_payment,
                        )
                    } else {
                        (
                            merged.advance,
                            merged.official_advance,
                            entry.official_payment,
                            entry.cash_payment,
                        )
                    };

                sqlx::query(
                    r#"
                    UPDATE payroll_entries
                    SET days_worked = ?, advance = ?, official_advance = ?,
                        overtime50 = ?, overtime100 = ?,
                        official_payment = ?, cash_payment = ?, sort_order = ?
                    WHERE id = ?
                    "#,
                )
                .bind(merged.days_worked)
                .bind(advance)
                .bind(official_advance)
                .bind(merged.overtime50)
                .bind(merged.overtime100)
                .bind(official_payment)
                .bind(cash_payment)
                .bind(merged.sort_order)
                .bind(entry.id)
                .execute(&mut *tx)
                .await?;

                touched.push((entry.id, serde_json::to_value(&entry).unwrap_or(Value::Null)));
            }
            None => {
                let merged = MergedEntry {
                    days_worked: item
                        .fields
                        .days_worked
                        .unwrap_or(employee.working_days_base),
                    advance: item.fields.advance.unwrap_or(0.0),
                    official_advance: item.fields.official_advance.unwrap_or(0.0),
                    overtime50: item.fields.overtime50.unwrap_or(0.0),
                    overtime100: item.fields.overtime100.unwrap_or(0.0),
                    sort_order: item.fields.sort_order.unwrap_or(0),
                };
                let (advance, official_advance, official_payment, cash_payment) =
                    if item.fields.touches_split() {
                        let split =
                            compute_split(&policy, &reconcile::split_input(&employee, &merged))?;
                        (
                            split.advance,
                            split.official_advance,
                            split.official_payment,
                            split.cash_payment,
                        )
                    } else {
                        (0.0, 0.0, 0.0, 0.0)
                    };

                let result = sqlx::query(
                    r#"
                    INSERT INTO payroll_entries
                    (employee_id, month, year, days_worked, advance, official_advance,
                     overtime50, overtime100, official_payment, cash_payment, sort_order)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(item.employee_id)
                .bind(item.month)
                .bind(item.year)
                .bind(merged.days_worked)
                .bind(advance)
                .bind(official_advance)
                .bind(merged.overtime50)
                .bind(merged.overtime100)
                .bind(official_payment)
                .bind(cash_payment)
                .bind(merged.sort_order)
                .execute(&mut *tx)
                .await?;

                touched.push((result.last_insert_id(), Value::Null));
            }
        }
    }

    tx.commit().await?;

    let mut views = Vec::with_capacity(touched.len());
    for (entry_id, before) in touched {
        let entry = fetch_entry(pool.get_ref(), entry_id).await?;
        let employee = fetch_employee(pool.get_ref(), entry.employee_id).await?;

        audit::record(
            pool.get_ref().clone(),
            auth.user_id,
            "payroll_entry",
            entry_id,
            before,
            serde_json::to_value(&entry).unwrap_or(Value::Null),
        );

        views.push(PayrollEntryView::build(&policy, &employee, &entry)?);
    }

    Ok(HttpResponse::Ok().json(views))
}
