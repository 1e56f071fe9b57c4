use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "Ayhan",
        "last_name": "Demir",
        "salary": 30000.0,
        "working_days_base": 30,
        "is_insured": true,
        "start_date": "2024-01-01",
        "end_date": null
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "Ayhan")]
    pub first_name: String,

    #[schema(example = "Demir")]
    pub last_name: String,

    /// Monthly gross salary, in the display currency
    #[schema(example = 30000.0)]
    pub salary: f64,

    /// Divisor used to derive the daily wage, 1-31
    #[schema(example = 30)]
    pub working_days_base: i32,

    /// Selects whether any pay flows through the official (declared) channel
    #[schema(example = true)]
    pub is_insured: bool,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    /// Set when the employee leaves; entries stop appearing for later periods
    #[schema(example = "2026-06-30", value_type = String, format = "date", nullable = true)]
    pub end_date: Option<NaiveDate>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
