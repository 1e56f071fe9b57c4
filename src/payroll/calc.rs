//! Stateless payroll formulas. Inputs are validated before any arithmetic so
//! a bad value can never reach storage through a calculated field.

use crate::error::ApiError;

pub fn daily_wage(salary: f64, working_days_base: i32) -> Result<f64, ApiError> {
    if salary < 0.0 {
        return Err(ApiError::validation("salary", "salary cannot be negative"));
    }
    if working_days_base <= 0 {
        return Err(ApiError::validation(
            "working_days_base",
            "working days base must be positive",
        ));
    }
    Ok(salary / working_days_base as f64)
}

pub fn earned_salary(daily_wage: f64, days_worked: i32) -> Result<f64, ApiError> {
    if daily_wage < 0.0 {
        return Err(ApiError::validation(
            "daily_wage",
            "daily wage cannot be negative",
        ));
    }
    if days_worked < 0 {
        return Err(ApiError::validation(
            "days_worked",
            "days worked cannot be negative",
        ));
    }
    Ok(daily_wage * days_worked as f64)
}

/// `advance_total` is the sum of the cash and official advances. The
/// official/cash payment split is an allocation of this same figure and must
/// NOT be subtracted again here.
pub fn total_receivable(
    earned_salary: f64,
    overtime50: f64,
    overtime100: f64,
    advance_total: f64,
) -> Result<f64, ApiError> {
    for (field, value) in [
        ("earned_salary", earned_salary),
        ("overtime50", overtime50),
        ("overtime100", overtime100),
        ("advance", advance_total),
    ] {
        if value < 0.0 {
            return Err(ApiError::validation(field, format!("{field} cannot be negative")));
        }
    }
    Ok(earned_salary + overtime50 + overtime100 - advance_total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn daily_wage_is_salary_over_base() {
        assert!((daily_wage(30000.0, 30).unwrap() - 1000.0).abs() < EPS);
        assert!((daily_wage(28075.0, 30).unwrap() - 935.8333333333334).abs() < EPS);
    }

    #[test]
    fn daily_wage_rejects_bad_inputs() {
        assert!(daily_wage(-1.0, 30).is_err());
        assert!(daily_wage(1000.0, 0).is_err());
        assert!(daily_wage(1000.0, -5).is_err());
    }

    #[test]
    fn earned_salary_is_wage_times_days() {
        let wage = daily_wage(30000.0, 30).unwrap();
        assert!((earned_salary(wage, 30).unwrap() - 30000.0).abs() < EPS);
        assert!((earned_salary(wage, 15).unwrap() - 15000.0).abs() < EPS);
        assert_eq!(earned_salary(wage, 0).unwrap(), 0.0);
    }

    #[test]
    fn earned_salary_rejects_negatives() {
        assert!(earned_salary(-1.0, 10).is_err());
        assert!(earned_salary(1000.0, -1).is_err());
    }

    #[test]
    fn total_receivable_subtracts_only_the_advance_sum() {
        // Channel payments are not deducted again: 30000 earned, no advances.
        assert!((total_receivable(30000.0, 0.0, 0.0, 0.0).unwrap() - 30000.0).abs() < EPS);
        // Overtime adds, advances subtract.
        assert!((total_receivable(10000.0, 500.0, 250.0, 3000.0).unwrap() - 7750.0).abs() < EPS);
    }

    #[test]
    fn total_receivable_rejects_negative_terms() {
        assert!(total_receivable(-1.0, 0.0, 0.0, 0.0).is_err());
        assert!(total_receivable(0.0, -1.0, 0.0, 0.0).is_err());
        assert!(total_receivable(0.0, 0.0, -1.0, 0.0).is_err());
        assert!(total_receivable(0.0, 0.0, 0.0, -1.0).is_err());
    }
}
