use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// The two fixed overtime multipliers. Stored as strings in MySQL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OvertimeType {
    Overtime50,
    Overtime100,
}

impl OvertimeType {
    /// Nominal hourly multiplier; informational only, the stored amount is
    /// computed by the caller and trusted as-is.
    pub fn multiplier(self) -> f64 {
        match self {
            OvertimeType::Overtime50 => 1.5,
            OvertimeType::Overtime100 => 2.0,
        }
    }
}

/// A single overtime ledger entry. The amount is fixed at creation time;
/// creating or deleting an entry atomically adjusts the matching payroll
/// entry's overtime50/overtime100 accumulator.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OvertimeEntry {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = "2026-03-14", value_type = String, format = "date")]
    pub entry_date: NaiveDate,

    #[schema(example = "overtime50")]
    pub kind: OvertimeType,

    #[schema(example = 1.5)]
    pub multiplier: f64,

    #[schema(example = 4.0)]
    pub hours: f64,

    #[schema(example = 750.0)]
    pub amount: f64,

    #[schema(example = "Inventory count", nullable = true)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_snake_case() {
        assert_eq!(OvertimeType::Overtime50.to_string(), "overtime50");
        assert_eq!(OvertimeType::Overtime100.to_string(), "overtime100");
        assert_eq!(
            OvertimeType::from_str("overtime100").unwrap(),
            OvertimeType::Overtime100
        );
    }

    #[test]
    fn multipliers_are_fixed() {
        assert_eq!(OvertimeType::Overtime50.multiplier(), 1.5);
        assert_eq!(OvertimeType::Overtime100.multiplier(), 2.0);
    }
}
