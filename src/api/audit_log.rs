use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::audit::AuditRecord;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::utils::user_cache;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AuditQuery {
    /// Filter by entity type, e.g. "payroll_entry" or "employee"
    #[schema(example = "payroll_entry")]
    pub entity: Option<String>,
    #[schema(example = 42)]
    pub entity_id: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// An audit row joined with the acting user's name, resolved through the
/// in-memory cache.
#[derive(Serialize, ToSchema)]
pub struct AuditView {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "admin", nullable = true)]
    pub username: Option<String>,
    #[schema(example = "payroll_entry")]
    pub entity: String,
    #[schema(example = 42)]
    pub entity_id: u64,
    #[schema(example = "advance")]
    pub field: String,
    #[schema(example = "0.0", nullable = true)]
    pub old_value: Option<String>,
    #[schema(example = "2000.0", nullable = true)]
    pub new_value: Option<String>,
    #[schema(example = "2026-03-14T10:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct AuditListResponse {
    pub data: Vec<AuditView>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 50)]
    pub per_page: u32,
    #[schema(example = 120)]
    pub total: i64,
}

/// List Audit Trail
#[utoipa::path(
    get,
    path = "/api/v1/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = AuditListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit"
)]
pub async fn list_audit_logs(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AuditQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    if query.entity.is_some() {
        conditions.push("entity = ?");
    }
    if query.entity_id.is_some() {
        conditions.push("entity_id = ?");
    }
    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM audit_logs {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(entity) = &query.entity {
        count_query = count_query.bind(entity);
    }
    if let Some(entity_id) = query.entity_id {
        count_query = count_query.bind(entity_id);
    }
    let total = count_query.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM audit_logs {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut data_query = sqlx::query_as::<_, AuditRecord>(&data_sql);
    if let Some(entity) = &query.entity {
        data_query = data_query.bind(entity);
    }
    if let Some(entity_id) = query.entity_id {
        data_query = data_query.bind(entity_id);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let records = data_query.fetch_all(pool.get_ref()).await?;

    let mut data = Vec::with_capacity(records.len());
    for record in records {
        let username = user_cache::display_name(pool.get_ref(), record.user_id).await;
        data.push(AuditView {
            id: record.id,
            user_id: record.user_id,
            username,
            entity: record.entity,
            entity_id: record.entity_id,
            field: record.field,
            old_value: record.old_value,
            new_value: record.new_value,
            created_at: record.created_at,
        });
    }

    Ok(HttpResponse::Ok().json(AuditListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
