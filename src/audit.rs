//! Field-level audit trail. Mutating handlers hand this module before/after
//! JSON snapshots after their own write has committed; recording happens in a
//! spawned task and a recording failure never fails the mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AuditRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
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

#[derive(Debug, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Field-by-field diff of two flat JSON object snapshots. Keys present in
/// either snapshot are compared; unchanged fields are omitted.
pub fn diff_snapshots(before: &Value, after: &Value) -> Vec<FieldChange> {
    let empty = serde_json::Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut fields: Vec<&String> = before.keys().chain(after.keys()).collect();
    fields.sort();
    fields.dedup();

    fields
        .into_iter()
        .filter_map(|field| {
            let old = before.get(field).unwrap_or(&Value::Null);
            let new = after.get(field).unwrap_or(&Value::Null);
            if old == new {
                return None;
            }
            Some(FieldChange {
                field: field.clone(),
                old: render(old),
                new: render(new),
            })
        })
        .collect()
}

/// Fire-and-forget: diffs the snapshots and persists one audit_logs row per
/// changed field. Errors are logged and swallowed.
pub fn record(pool: MySqlPool, user_id: u64, entity: &'static str, entity_id: u64, before: Value, after: Value) {
    actix_web::rt::spawn(async move {
        for change in diff_snapshots(&before, &after) {
            let result = sqlx::query(
                r#"
                INSERT INTO audit_logs (user_id, entity, entity_id, field, old_value, new_value)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(entity)
            .bind(entity_id)
            .bind(&change.field)
            .bind(&change.old)
            .bind(&change.new)
            .execute(&pool)
            .await;

            if let Err(e) = result {
                error!(error = %e, entity, entity_id, field = %change.field, "Failed to record audit change");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diff_reports_only_changed_fields() {
        let before = json!({"days_worked": 30, "advance": 0.0, "sort_order": 1});
        let after = json!({"days_worked": 28, "advance": 0.0, "sort_order": 1});

        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "days_worked");
        assert_eq!(changes[0].old.as_deref(), Some("30"));
        assert_eq!(changes[0].new.as_deref(), Some("28"));
    }

    #[test]
    fn diff_handles_added_and_removed_fields() {
        let before = json!({"a": 1});
        let after = json!({"b": 2});

        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "a");
        assert_eq!(changes[0].old.as_deref(), Some("1"));
        assert_eq!(changes[0].new, None);
        assert_eq!(changes[1].field, "b");
        assert_eq!(changes[1].new.as_deref(), Some("2"));
    }

    #[test]
    fn identical_snapshots_produce_no_changes() {
        let snap = json!({"advance": 1000.0, "days_worked": 30});
        assert!(diff_snapshots(&snap, &snap.clone()).is_empty());
    }

    #[test]
    fn accumulator_decrement_diffs_to_the_overtime_field() {
        // Deleting a ledger entry changes exactly the matching accumulator
        // on the payroll entry; the rest of the snapshot must not show up.
        let before = json!({"id": 9, "days_worked": 30, "overtime50": 750.0, "cash_payment": 2675.0});
        let after = json!({"id": 9, "days_worked": 30, "overtime50": 0.0, "cash_payment": 2675.0});
        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "overtime50");
        assert_eq!(changes[0].old.as_deref(), Some("750.0"));
        assert_eq!(changes[0].new.as_deref(), Some("0.0"));
    }

    #[test]
    fn string_values_render_without_quotes() {
        let before = json!({"description": "old"});
        let after = json!({"description": "new"});
        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes[0].old.as_deref(), Some("old"));
        assert_eq!(changes[0].new.as_deref(), Some("new"));
    }
}
