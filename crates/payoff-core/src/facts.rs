//! Fact registry: the closed set of numbers a nudge may quote
//!
//! A [`FactSet`] is built fresh for every nudge from the plan (and the slip
//! check, when there is one). It is passed explicitly to the validator;
//! there is no shared allow-list.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PayoffPlan, SlipResult};
use crate::money::Canonical;

/// Names of the facts in a [`FactSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    TotalRemaining,
    MonthlyBudget,
    TopDebtBalance,
    TopDebtApr,
    TopDebtPayoffMonths,
    SuggestedExtra,
}

impl Fact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalRemaining => "total_remaining",
            Self::MonthlyBudget => "monthly_budget",
            Self::TopDebtBalance => "top_debt_balance",
            Self::TopDebtApr => "top_debt_apr",
            Self::TopDebtPayoffMonths => "top_debt_payoff_months",
            Self::SuggestedExtra => "suggested_extra",
        }
    }

    /// Short description used when rendering facts into a prompt
    pub fn describe(&self) -> &'static str {
        match self {
            Self::TotalRemaining => "Total debt remaining ($)",
            Self::MonthlyBudget => "Monthly budget ($)",
            Self::TopDebtBalance => "Balance of the current focus debt ($)",
            Self::TopDebtApr => "APR of the current focus debt (%)",
            Self::TopDebtPayoffMonths => "Months until the focus debt is paid off",
            Self::SuggestedExtra => "Suggested extra monthly payment ($)",
        }
    }
}

/// Canonicalized numeric facts for one nudge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFactSet")]
pub struct FactSet {
    pub total_remaining: Canonical,
    pub monthly_budget: Canonical,
    pub top_debt_balance: Canonical,
    pub top_debt_apr: Canonical,
    pub top_debt_payoff_months: Canonical,
    pub suggested_extra: Canonical,
}

impl FactSet {
    /// Build directly from values (amounts in currency, APR in percent)
    pub fn new(
        total_remaining: Decimal,
        monthly_budget: Decimal,
        top_debt_balance: Decimal,
        top_debt_apr: Decimal,
        top_debt_payoff_months: u32,
        suggested_extra: Decimal,
    ) -> Self {
        Self {
            total_remaining: Canonical::amount(total_remaining),
            monthly_budget: Canonical::amount(monthly_budget),
            top_debt_balance: Canonical::amount(top_debt_balance),
            top_debt_apr: Canonical::rate(top_debt_apr),
            top_debt_payoff_months: Canonical::count(top_debt_payoff_months),
            suggested_extra: Canonical::amount(suggested_extra),
        }
    }

    /// All facts with their names, in a fixed order
    pub fn entries(&self) -> [(Fact, &Canonical); 6] {
        [
            (Fact::TotalRemaining, &self.total_remaining),
            (Fact::MonthlyBudget, &self.monthly_budget),
            (Fact::TopDebtBalance, &self.top_debt_balance),
            (Fact::TopDebtApr, &self.top_debt_apr),
            (Fact::TopDebtPayoffMonths, &self.top_debt_payoff_months),
            (Fact::SuggestedExtra, &self.suggested_extra),
        ]
    }

    /// Whether `value` is exactly one of the facts
    pub fn contains(&self, value: &Canonical) -> bool {
        self.entries().iter().any(|(_, fact)| *fact == value)
    }

    /// Which fact `value` matches, if any
    pub fn lookup(&self, value: &Canonical) -> Option<Fact> {
        self.entries()
            .iter()
            .find(|(_, fact)| *fact == value)
            .map(|(name, _)| *name)
    }
}

/// Builds [`FactSet`]s from calculator output
pub struct FactRegistry;

impl FactRegistry {
    /// Collect the facts for `plan`, optionally refined by a slip check.
    ///
    /// The top debt is the first in the plan's priority order that started
    /// with a balance. With a slip check the budget is the checked budget,
    /// and an infeasible check makes its suggestion the suggested extra.
    pub fn build(plan: &PayoffPlan, slip: Option<&SlipResult>) -> FactSet {
        let (top_balance, top_apr, top_months) = plan
            .top_debt()
            .map(|d| (d.starting_balance, d.apr, d.payoff_month))
            .unwrap_or((Decimal::ZERO, Decimal::ZERO, 0));

        let monthly_budget = slip
            .map(|s| s.monthly_budget)
            .unwrap_or_else(|| plan.first_month_payment());

        let suggested_extra = match slip {
            Some(s) if !s.is_feasible => s.suggestion_amount,
            _ => plan.extra_payment,
        };

        FactSet::new(
            plan.starting_balance,
            monthly_budget,
            top_balance,
            top_apr,
            top_months,
            suggested_extra,
        )
    }
}

/// Wire form: plain numbers (or numeric strings) per fact
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFactSet {
    total_remaining: Decimal,
    monthly_budget: Decimal,
    top_debt_balance: Decimal,
    top_debt_apr: Decimal,
    top_debt_payoff_months: Decimal,
    suggested_extra: Decimal,
}

impl TryFrom<RawFactSet> for FactSet {
    type Error = String;

    fn try_from(raw: RawFactSet) -> std::result::Result<Self, Self::Error> {
        let values = [
            raw.total_remaining,
            raw.monthly_budget,
            raw.top_debt_balance,
            raw.top_debt_apr,
            raw.top_debt_payoff_months,
            raw.suggested_extra,
        ];
        if values.iter().any(|v| v.is_sign_negative() && !v.is_zero()) {
            return Err("facts cannot be negative".to_string());
        }

        let months = raw.top_debt_payoff_months;
        if months.fract() != Decimal::ZERO {
            return Err("top_debt_payoff_months must be a whole number".to_string());
        }
        let months = months
            .to_u32()
            .ok_or_else(|| "top_debt_payoff_months is out of range".to_string())?;

        Ok(FactSet::new(
            raw.total_remaining,
            raw.monthly_budget,
            raw.top_debt_balance,
            raw.top_debt_apr,
            months,
            raw.suggested_extra,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Debt, PaymentStrategy};
    use crate::money::NumberKind;
    use crate::planner::PayoffCalculator;
    use crate::slip::SlipDetector;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn plan() -> PayoffPlan {
        let debts = vec![
            Debt::new("Loan", dec!(4500), dec!(6), dec!(100)),
            Debt::new("Card", dec!(500), dec!(20), dec!(50)),
        ];
        PayoffCalculator::new(dec!(100))
            .starting_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .calculate(&debts, PaymentStrategy::Avalanche, None)
            .unwrap()
    }

    #[test]
    fn test_build_from_plan() {
        let plan = plan();
        let facts = FactRegistry::build(&plan, None);

        assert_eq!(facts.total_remaining.as_str(), "5000.00");
        assert_eq!(facts.top_debt_balance.as_str(), "500.00");
        assert_eq!(facts.top_debt_apr.as_str(), "20.0");
        assert_eq!(facts.monthly_budget.as_str(), "250.00");
        assert_eq!(facts.suggested_extra.as_str(), "100.00");
        assert_eq!(
            facts.top_debt_payoff_months,
            Canonical::count(plan.debts[0].payoff_month)
        );
    }

    #[test]
    fn test_slip_overrides_budget_and_extra() {
        let plan = plan();
        let debts = vec![
            Debt::new("Loan", dec!(4500), dec!(6), dec!(100)),
            Debt::new("Card", dec!(500), dec!(20), dec!(50)),
        ];
        let slip = SlipDetector::new().check(&debts, dec!(120)).unwrap();
        let facts = FactRegistry::build(&plan, Some(&slip));

        assert_eq!(facts.monthly_budget.as_str(), "120.00");
        assert_eq!(facts.suggested_extra.as_str(), "50.00");
    }

    #[test]
    fn test_contains_is_kind_aware() {
        let facts = FactRegistry::build(&plan(), None);
        assert!(facts.contains(&Canonical::parse("$5,000", NumberKind::Amount).unwrap()));
        assert!(facts.contains(&Canonical::parse("20%", NumberKind::Rate).unwrap()));
        assert!(!facts.contains(&Canonical::parse("20", NumberKind::Amount).unwrap()));
        assert_eq!(
            facts.lookup(&Canonical::amount(dec!(500))),
            Some(Fact::TopDebtBalance)
        );
    }

    #[test]
    fn test_wire_form() {
        let facts: FactSet = serde_json::from_str(
            r#"{"total_remaining": 5000, "monthly_budget": "250", "top_debt_balance": 500,
                "top_debt_apr": "19.9", "top_debt_payoff_months": 4, "suggested_extra": 100}"#,
        )
        .unwrap();
        assert_eq!(facts.total_remaining.as_str(), "5000.00");
        assert_eq!(facts.top_debt_apr.as_str(), "19.9");

        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json["top_debt_payoff_months"], "4.00");
        let back: FactSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, facts);
    }

    #[test]
    fn test_wire_form_rejects_fractional_months() {
        let result: std::result::Result<FactSet, _> = serde_json::from_str(
            r#"{"total_remaining": 1, "monthly_budget": 1, "top_debt_balance": 1,
                "top_debt_apr": 1, "top_debt_payoff_months": 2.5, "suggested_extra": 1}"#,
        );
        assert!(result.is_err());
    }
}
