//! Official/cash split engine.
//!
//! Pay is legally bifurcated into a declared (official, insurance-relevant,
//! capped) portion and an undeclared cash remainder. Each channel tracks its
//! own advances, and an advance may never exceed the base it is drawn from.

use crate::error::ApiError;
use crate::payroll::calc;

/// Business-configured ceiling on declared pay: `official_daily_cap`
/// divided by `official_base_days` gives the capped daily rate applied to
/// insured employees regardless of their actual salary.
#[derive(Debug, Clone, Copy)]
pub struct SplitPolicy {
    pub official_daily_cap: f64,
    pub official_base_days: i32,
}

impl SplitPolicy {
    pub fn official_daily_rate(&self) -> f64 {
        self.official_daily_cap / self.official_base_days as f64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SplitInput {
    pub salary: f64,
    pub working_days_base: i32,
    pub is_insured: bool,
    pub days_worked: i32,
    pub overtime50: f64,
    pub overtime100: f64,
    /// Cash-channel advance as supplied by the caller, clamped here
    pub advance: f64,
    /// Official-channel advance as supplied by the caller, clamped here
    pub official_advance: f64,
}

/// Split result. `advance`/`official_advance` are the values actually
/// accepted after clamping against the freshly computed bases; callers must
/// persist these, never the raw inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaySplit {
    pub official_base: f64,
    pub cash_base: f64,
    pub official_payment: f64,
    pub cash_payment: f64,
    pub advance: f64,
    pub official_advance: f64,
}

pub fn compute_split(policy: &SplitPolicy, input: &SplitInput) -> Result<PaySplit, ApiError> {
    for (field, value) in [
        ("overtime50", input.overtime50),
        ("overtime100", input.overtime100),
        ("advance", input.advance),
        ("official_advance", input.official_advance),
    ] {
        if value < 0.0 {
            return Err(ApiError::validation(field, format!("{field} cannot be negative")));
        }
    }
    if !(0..=31).contains(&input.days_worked) {
        return Err(ApiError::validation(
            "days_worked",
            "days worked must be between 0 and 31",
        ));
    }

    let wage = calc::daily_wage(input.salary, input.working_days_base)?;
    let days = input.days_worked as f64;
    let earned = (wage * days).max(0.0);

    // The official portion is capped by the policy daily rate; uninsured
    // employees have no official channel at all.
    let official_base = if input.is_insured {
        earned.min((policy.official_daily_rate() * days).max(0.0))
    } else {
        0.0
    };

    // Overtime is always paid in cash, on top of whatever earned salary
    // exceeds the official cap.
    let cash_base = (earned - official_base).max(0.0)
        + input.overtime50.max(0.0)
        + input.overtime100.max(0.0);

    let official_advance = if input.is_insured {
        input.official_advance.clamp(0.0, official_base)
    } else {
        0.0
    };
    let advance = input.advance.clamp(0.0, cash_base);

    let official_payment = if input.is_insured {
        (official_base - official_base.min(official_advance)).max(0.0)
    } else {
        0.0
    };
    let cash_payment = (cash_base - cash_base.min(advance)).max(0.0);

    Ok(PaySplit {
        official_base,
        cash_base,
        official_payment,
        cash_payment,
        advance,
        official_advance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn policy() -> SplitPolicy {
        SplitPolicy {
            official_daily_cap: 28075.0,
            official_base_days: 30,
        }
    }

    fn insured_base() -> SplitInput {
        SplitInput {
            salary: 30000.0,
            working_days_base: 30,
            is_insured: true,
            days_worked: 30,
            overtime50: 0.0,
            overtime100: 0.0,
            advance: 0.0,
            official_advance: 0.0,
        }
    }

    #[test]
    fn insured_full_month_splits_at_the_cap() {
        let split = compute_split(&policy(), &insured_base()).unwrap();
        assert!((split.official_base - 28075.0).abs() < EPS);
        assert!((split.cash_base - 1925.0).abs() < EPS);
        assert!((split.official_payment - 28075.0).abs() < EPS);
        assert!((split.cash_payment - 1925.0).abs() < EPS);
    }

    #[test]
    fn official_advance_reduces_only_the_official_channel() {
        let input = SplitInput {
            official_advance: 10000.0,
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        assert!((split.official_payment - 18075.0).abs() < EPS);
        assert!((split.cash_payment - 1925.0).abs() < EPS);
        assert!((split.official_advance - 10000.0).abs() < EPS);
    }

    #[test]
    fn uninsured_employee_has_no_official_channel() {
        let input = SplitInput {
            salary: 20000.0,
            is_insured: false,
            days_worked: 15,
            overtime50: 500.0,
            official_advance: 9999.0, // must be forced to zero
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        assert_eq!(split.official_base, 0.0);
        assert_eq!(split.official_payment, 0.0);
        assert_eq!(split.official_advance, 0.0);
        assert!((split.cash_base - 10500.0).abs() < EPS);
        assert!((split.cash_payment - 10500.0).abs() < EPS);
    }

    #[test]
    fn official_base_never_exceeds_cap_or_earned() {
        // Salary below the cap: earned is the binding limit.
        let input = SplitInput {
            salary: 15000.0,
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        assert!((split.official_base - 15000.0).abs() < EPS);
        assert_eq!(split.cash_base, 0.0);

        // Salary above the cap: the policy rate binds.
        let input = SplitInput {
            salary: 90000.0,
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        assert!((split.official_base - 28075.0).abs() < EPS);
        assert!((split.cash_base - 61925.0).abs() < EPS);
    }

    #[test]
    fn advances_are_clamped_to_their_bases() {
        let input = SplitInput {
            advance: 1_000_000.0,
            official_advance: 1_000_000.0,
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        assert!((split.advance - split.cash_base).abs() < EPS);
        assert!((split.official_advance - split.official_base).abs() < EPS);
        assert_eq!(split.official_payment, 0.0);
        assert_eq!(split.cash_payment, 0.0);
    }

    #[test]
    fn zero_days_worked_zeroes_everything_but_overtime() {
        let input = SplitInput {
            days_worked: 0,
            overtime50: 300.0,
            overtime100: 200.0,
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        assert_eq!(split.official_base, 0.0);
        assert!((split.cash_base - 500.0).abs() < EPS);
        assert!((split.cash_payment - 500.0).abs() < EPS);
    }

    #[test]
    fn partial_month_caps_proportionally() {
        let input = SplitInput {
            days_worked: 15,
            ..insured_base()
        };
        let split = compute_split(&policy(), &input).unwrap();
        // 15 days earned = 15000, cap = 935.8333... * 15 = 14037.5
        assert!((split.official_base - 14037.5).abs() < EPS);
        assert!((split.cash_base - 962.5).abs() < EPS);
    }

    #[test]
    fn negative_inputs_are_rejected_before_arithmetic() {
        for patch in [
            SplitInput { overtime50: -1.0, ..insured_base() },
            SplitInput { overtime100: -1.0, ..insured_base() },
            SplitInput { advance: -1.0, ..insured_base() },
            SplitInput { official_advance: -1.0, ..insured_base() },
            SplitInput { days_worked: -1, ..insured_base() },
            SplitInput { days_worked: 32, ..insured_base() },
            SplitInput { salary: -1.0, ..insured_base() },
        ] {
            assert!(compute_split(&policy(), &patch).is_err());
        }
    }
}
