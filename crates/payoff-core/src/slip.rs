//! Budget slip detection
//!
//! A "slip" is a month where the budget does not cover the minimum
//! payments. The remediation is quantized: the shortfall is rounded up to
//! the next $25 with a $25 floor.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Debt, SlipResult};
use crate::money::{check_amount, MAX_AMOUNT};

/// Anything that carries a minimum monthly payment
pub trait MinimumPayment {
    fn label(&self) -> &str;
    fn minimum_payment(&self) -> Decimal;
}

impl MinimumPayment for Debt {
    fn label(&self) -> &str {
        &self.name
    }

    fn minimum_payment(&self) -> Decimal {
        self.minimum_payment
    }
}

/// Debt shape accepted by slip checks; balance and APR are not needed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipDebt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub minimum_payment: Decimal,
}

impl MinimumPayment for SlipDebt {
    fn label(&self) -> &str {
        &self.name
    }

    fn minimum_payment(&self) -> Decimal {
        self.minimum_payment
    }
}

impl From<&Debt> for SlipDebt {
    fn from(debt: &Debt) -> Self {
        Self {
            id: debt.id.clone(),
            name: debt.name.clone(),
            minimum_payment: debt.minimum_payment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlipDetector {
    increment: Decimal,
    floor: Decimal,
}

impl Default for SlipDetector {
    fn default() -> Self {
        Self {
            increment: dec!(25),
            floor: dec!(25),
        }
    }
}

impl SlipDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `monthly_budget` against the minimum payments of `debts`
    pub fn check<D: MinimumPayment>(&self, debts: &[D], monthly_budget: Decimal) -> Result<SlipResult> {
        if monthly_budget < Decimal::ZERO {
            return Err(Error::InvalidInput(
                "Monthly budget cannot be negative".into(),
            ));
        }
        check_amount("Monthly budget", monthly_budget)?;
        if let Some(debt) = debts.iter().find(|d| d.minimum_payment() < Decimal::ZERO) {
            return Err(Error::InvalidInput(format!(
                "Minimum payment for '{}' cannot be negative",
                debt.label()
            )));
        }
        if let Some(debt) = debts.iter().find(|d| d.minimum_payment() > MAX_AMOUNT) {
            return Err(Error::InvalidInput(format!(
                "Minimum payment for '{}' cannot exceed {}",
                debt.label(),
                MAX_AMOUNT
            )));
        }

        let total: Decimal = debts.iter().map(|d| d.minimum_payment()).sum();
        let shortfall = (total - monthly_budget).max(Decimal::ZERO);

        let result = if shortfall.is_zero() {
            SlipResult {
                is_feasible: true,
                monthly_budget,
                total_minimum_payments: total,
                surplus: monthly_budget - total,
                shortfall: Decimal::ZERO,
                suggestion_amount: Decimal::ZERO,
                suggestion_text: None,
                message: if debts.is_empty() {
                    "No debts to analyze".to_string()
                } else {
                    "Budget is sufficient for all minimum payments".to_string()
                },
            }
        } else {
            let suggestion = self.suggestion(shortfall);
            SlipResult {
                is_feasible: false,
                monthly_budget,
                total_minimum_payments: total,
                surplus: Decimal::ZERO,
                shortfall,
                suggestion_amount: suggestion,
                suggestion_text: Some(format!("Apply ${:.0}", suggestion)),
                message: format!(
                    "Budget shortfall of ${:.2}. Consider applying ${:.0} additional monthly budget.",
                    shortfall, suggestion
                ),
            }
        };

        debug!(
            feasible = result.is_feasible,
            shortfall = %result.shortfall,
            suggestion = %result.suggestion_amount,
            "Slip check"
        );

        Ok(result)
    }

    /// `max(floor, ceil(shortfall / increment) * increment)`; zero when there is no shortfall
    pub fn suggestion(&self, shortfall: Decimal) -> Decimal {
        if shortfall <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let stepped = (shortfall / self.increment).ceil() * self.increment;
        stepped.max(self.floor).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slip_debts(minimums: &[Decimal]) -> Vec<SlipDebt> {
        minimums
            .iter()
            .enumerate()
            .map(|(i, m)| SlipDebt {
                id: Some(format!("d{}", i)),
                name: format!("Debt {}", i),
                minimum_payment: *m,
            })
            .collect()
    }

    #[test]
    fn test_shortfall_on_increment() {
        let result = SlipDetector::new()
            .check(&slip_debts(&[dec!(100), dec!(50)]), dec!(100))
            .unwrap();
        assert!(!result.is_feasible);
        assert_eq!(result.shortfall, dec!(50));
        assert_eq!(result.suggestion_amount, dec!(50));
        assert_eq!(result.suggestion_text.as_deref(), Some("Apply $50"));
    }

    #[test]
    fn test_small_shortfall_uses_floor() {
        let result = SlipDetector::new()
            .check(&slip_debts(&[dec!(60), dec!(49)]), dec!(100))
            .unwrap();
        assert_eq!(result.shortfall, dec!(9));
        assert_eq!(result.suggestion_amount, dec!(25));
        assert_eq!(result.suggestion_text.as_deref(), Some("Apply $25"));
    }

    #[test]
    fn test_rounds_up_to_next_increment() {
        let detector = SlipDetector::new();
        assert_eq!(detector.suggestion(dec!(25.01)), dec!(50));
        assert_eq!(detector.suggestion(dec!(75)), dec!(75));
        assert_eq!(detector.suggestion(dec!(0.01)), dec!(25));
        assert_eq!(detector.suggestion(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_feasible_budget() {
        let result = SlipDetector::new()
            .check(&slip_debts(&[dec!(40), dec!(60)]), dec!(120))
            .unwrap();
        assert!(result.is_feasible);
        assert_eq!(result.shortfall, Decimal::ZERO);
        assert_eq!(result.surplus, dec!(20));
        assert_eq!(result.suggestion_amount, Decimal::ZERO);
        assert!(result.suggestion_text.is_none());
    }

    #[test]
    fn test_exact_budget_is_feasible() {
        let result = SlipDetector::new()
            .check(&slip_debts(&[dec!(100)]), dec!(100))
            .unwrap();
        assert!(result.is_feasible);
        assert_eq!(result.surplus, Decimal::ZERO);
    }

    #[test]
    fn test_no_debts() {
        let result = SlipDetector::new()
            .check::<SlipDebt>(&[], Decimal::ZERO)
            .unwrap();
        assert!(result.is_feasible);
        assert_eq!(result.shortfall, Decimal::ZERO);
        assert_eq!(result.message, "No debts to analyze");
    }

    #[test]
    fn test_zero_budget() {
        let result = SlipDetector::new()
            .check(&slip_debts(&[dec!(35), dec!(20)]), Decimal::ZERO)
            .unwrap();
        assert!(!result.is_feasible);
        assert_eq!(result.shortfall, dec!(55));
        assert_eq!(result.suggestion_amount, dec!(75));
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let detector = SlipDetector::new();
        assert!(detector.check(&slip_debts(&[dec!(10)]), dec!(-1)).is_err());
        assert!(detector.check(&slip_debts(&[dec!(-10)]), dec!(100)).is_err());
    }

    #[test]
    fn test_out_of_range_inputs_rejected() {
        let detector = SlipDetector::new();
        let huge = Decimal::MAX;
        assert!(matches!(
            detector.check(&slip_debts(&[huge, huge]), dec!(100)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            detector.check(&slip_debts(&[dec!(10)]), huge),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_accepts_full_debts() {
        let debts = vec![Debt::new("Card", dec!(900), dec!(19), dec!(45))];
        let result = SlipDetector::new().check(&debts, dec!(40)).unwrap();
        assert_eq!(result.shortfall, dec!(5));
        assert_eq!(result.suggestion_amount, dec!(25));
    }
}
