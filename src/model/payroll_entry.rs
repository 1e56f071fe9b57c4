use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row per (employee, month, year); the unique key is enforced by the
/// store and every write path targets that slot.
///
/// `official_payment`/`cash_payment` are outputs of the split engine persisted
/// for read efficiency. Reads always recompute them from current employee
/// fields, so the stored pair is a cache refreshed on every relevant write.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollEntry {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 30)]
    pub days_worked: i32,

    /// Advance drawn from the cash channel
    #[schema(example = 0.0)]
    pub advance: f64,

    /// Advance drawn from the official channel; zero for uninsured employees
    #[schema(example = 0.0)]
    pub official_advance: f64,

    /// Accumulated 50% overtime amount, maintained by the overtime ledger
    #[schema(example = 0.0)]
    pub overtime50: f64,

    /// Accumulated 100% overtime amount, maintained by the overtime ledger
    #[schema(example = 0.0)]
    pub overtime100: f64,

    #[schema(example = 28075.0)]
    pub official_payment: f64,

    #[schema(example = 1925.0)]
    pub cash_payment: f64,

    #[schema(example = 0)]
    pub sort_order: i32,
}
