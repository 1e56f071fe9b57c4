//! Period reconciliation rules: which employees belong to a period, how
//! partial updates merge over stored entries, and when the split engine must
//! be re-run. The handlers in `api::payroll` drive these against the store.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::{employee::Employee, payroll_entry::PayrollEntry};
use crate::payroll::split::SplitInput;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

pub fn validate_period(month: u32, year: i32) -> Result<(), ApiError> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::InvalidMonth);
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ApiError::InvalidYear);
    }
    Ok(())
}

/// An employee belongs to a period when they have no end date, or their end
/// date's (year, month) is on/after the requested period. Applied both to
/// auto-creation and to the returned list.
pub fn active_for_period(end_date: Option<NaiveDate>, month: u32, year: i32) -> bool {
    match end_date {
        None => true,
        Some(d) => (d.year(), d.month()) >= (year, month),
    }
}

/// Partial update over a payroll entry. `official_payment`/`cash_payment`
/// are deliberately absent: they are derived by the split engine.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct EntryPatch {
    #[schema(example = 28)]
    pub days_worked: Option<i32>,
    #[schema(example = 2000.0)]
    pub advance: Option<f64>,
    #[schema(example = 0.0)]
    pub official_advance: Option<f64>,
    #[schema(example = 0.0)]
    pub overtime50: Option<f64>,
    #[schema(example = 0.0)]
    pub overtime100: Option<f64>,
    #[schema(example = 0)]
    pub sort_order: Option<i32>,
}

impl EntryPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(d) = self.days_worked {
            if !(0..=31).contains(&d) {
                return Err(ApiError::validation(
                    "days_worked",
                    "days worked must be between 0 and 31",
                ));
            }
        }
        for (field, value) in [
            ("advance", self.advance),
            ("official_advance", self.official_advance),
            ("overtime50", self.overtime50),
            ("overtime100", self.overtime100),
        ] {
            if let Some(v) = value {
                if v < 0.0 {
                    return Err(ApiError::validation(field, format!("{field} cannot be negative")));
                }
            }
        }
        if let Some(s) = self.sort_order {
            if s < 0 {
                return Err(ApiError::validation(
                    "sort_order",
                    "sort order cannot be negative",
                ));
            }
        }
        Ok(())
    }

    /// True when the patch changes days worked or an advance. Batch updates
    /// skip the split recomputation otherwise; overtime-only changes leave
    /// the stored payments as a stale cache that the next read refreshes.
    pub fn touches_split(&self) -> bool {
        self.days_worked.is_some() || self.advance.is_some() || self.official_advance.is_some()
    }
}

/// Field values after laying a patch over the stored entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedEntry {
    pub days_worked: i32,
    pub advance: f64,
    pub official_advance: f64,
    pub overtime50: f64,
    pub overtime100: f64,
    pub sort_order: i32,
}

pub fn merge(existing: &PayrollEntry, patch: &EntryPatch) -> MergedEntry {
    MergedEntry {
        days_worked: patch.days_worked.unwrap_or(existing.days_worked),
        advance: patch.advance.unwrap_or(existing.advance),
        official_advance: patch.official_advance.unwrap_or(existing.official_advance),
        overtime50: patch.overtime50.unwrap_or(existing.overtime50),
        overtime100: patch.overtime100.unwrap_or(existing.overtime100),
        sort_order: patch.sort_order.unwrap_or(existing.sort_order),
    }
}

/// Split-engine input from the employee's *current* identity fields and the
/// merged entry values. Advances are always re-validated against bases
/// recomputed from these fresh values, never against stale ones.
pub fn split_input(employee: &Employee, merged: &MergedEntry) -> SplitInput {
    SplitInput {
        salary: employee.salary,
        working_days_base: employee.working_days_base,
        is_insured: employee.is_insured,
        days_worked: merged.days_worked,
        overtime50: merged.overtime50,
        overtime100: merged.overtime100,
        advance: merged.advance,
        official_advance: merged.official_advance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> PayrollEntry {
        PayrollEntry {
            id: 1,
            employee_id: 7,
            month: 3,
            year: 2026,
            days_worked: 30,
            advance: 1000.0,
            official_advance: 0.0,
            overtime50: 250.0,
            overtime100: 0.0,
            official_payment: 0.0,
            cash_payment: 0.0,
            sort_order: 2,
        }
    }

    #[test]
    fn period_bounds_are_enforced() {
        assert!(validate_period(1, 2000).is_ok());
        assert!(validate_period(12, 2100).is_ok());
        assert!(matches!(validate_period(0, 2026), Err(ApiError::InvalidMonth)));
        assert!(matches!(validate_period(13, 2026), Err(ApiError::InvalidMonth)));
        assert!(matches!(validate_period(6, 1999), Err(ApiError::InvalidYear)));
        assert!(matches!(validate_period(6, 2101), Err(ApiError::InvalidYear)));
    }

    #[test]
    fn employees_without_end_date_are_always_active() {
        assert!(active_for_period(None, 1, 2026));
    }

    #[test]
    fn end_date_before_period_excludes_employee() {
        let left = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert!(!active_for_period(Some(left), 3, 2026));
        assert!(active_for_period(Some(left), 2, 2026));
        assert!(active_for_period(Some(left), 1, 2026));
        // Year boundary
        assert!(!active_for_period(Some(left), 1, 2027));
        assert!(active_for_period(Some(left), 12, 2025));
    }

    #[test]
    fn merge_keeps_stored_values_for_absent_fields() {
        let patch = EntryPatch {
            days_worked: Some(20),
            ..Default::default()
        };
        let merged = merge(&entry(), &patch);
        assert_eq!(merged.days_worked, 20);
        assert_eq!(merged.advance, 1000.0);
        assert_eq!(merged.overtime50, 250.0);
        assert_eq!(merged.sort_order, 2);
    }

    #[test]
    fn patch_validation_catches_out_of_bounds() {
        assert!(EntryPatch { days_worked: Some(32), ..Default::default() }.validate().is_err());
        assert!(EntryPatch { days_worked: Some(-1), ..Default::default() }.validate().is_err());
        assert!(EntryPatch { advance: Some(-0.5), ..Default::default() }.validate().is_err());
        assert!(EntryPatch { overtime100: Some(-1.0), ..Default::default() }.validate().is_err());
        assert!(EntryPatch { sort_order: Some(-1), ..Default::default() }.validate().is_err());
        assert!(EntryPatch::default().validate().is_ok());
    }

    #[test]
    fn only_days_and_advances_trigger_split_recompute() {
        assert!(!EntryPatch { sort_order: Some(5), ..Default::default() }.touches_split());
        assert!(!EntryPatch { overtime50: Some(100.0), ..Default::default() }.touches_split());
        assert!(EntryPatch { advance: Some(100.0), ..Default::default() }.touches_split());
        assert!(EntryPatch { days_worked: Some(1), ..Default::default() }.touches_split());
        assert!(EntryPatch { official_advance: Some(1.0), ..Default::default() }.touches_split());
    }
}
