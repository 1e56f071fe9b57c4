use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Independent bookkeeping: fines never interact with the payroll split.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TrafficFine {
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
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TrafficFinePayment {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub fine_id: u64,

    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    pub payment_date: NaiveDate,

    #[schema(example = 500.0)]
    pub amount: f64,
}
