//! Snowball vs avalanche comparison

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{Debt, PayoffPlan, PaymentStrategy};
use crate::planner::PayoffCalculator;

const LARGE_SAVINGS: Decimal = dec!(500);
const MODERATE_SAVINGS: Decimal = dec!(100);
const MOMENTUM_MONTHS: i64 = 3;

/// Both plans side by side with a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub snowball: PayoffPlan,
    pub avalanche: PayoffPlan,
    pub recommended: PaymentStrategy,
    /// Snowball interest minus avalanche interest
    pub interest_savings: Decimal,
    /// Snowball months minus avalanche months (positive: avalanche finishes first)
    pub time_savings_months: i64,
    pub recommendation_reason: String,
}

impl StrategyComparison {
    /// The plan for the recommended strategy
    pub fn recommended_plan(&self) -> &PayoffPlan {
        match self.recommended {
            PaymentStrategy::Avalanche => &self.avalanche,
            _ => &self.snowball,
        }
    }
}

/// Summary without the full schedules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub recommended: PaymentStrategy,
    pub snowball_total_months: u32,
    pub snowball_total_interest: Decimal,
    pub avalanche_total_months: u32,
    pub avalanche_total_interest: Decimal,
    pub interest_savings: Decimal,
    pub time_savings_months: i64,
    pub recommendation_reason: String,
}

impl From<&StrategyComparison> for ComparisonSummary {
    fn from(c: &StrategyComparison) -> Self {
        Self {
            recommended: c.recommended,
            snowball_total_months: c.snowball.total_months,
            snowball_total_interest: c.snowball.total_interest,
            avalanche_total_months: c.avalanche.total_months,
            avalanche_total_interest: c.avalanche.total_interest,
            interest_savings: c.interest_savings,
            time_savings_months: c.time_savings_months,
            recommendation_reason: c.recommendation_reason.clone(),
        }
    }
}

/// Run both strategies with the same calculator
pub fn compare_with(calculator: &PayoffCalculator, debts: &[Debt]) -> Result<StrategyComparison> {
    let snowball = calculator.calculate_snowball(debts)?;
    let avalanche = calculator.calculate_avalanche(debts)?;

    let interest_savings = snowball.total_interest - avalanche.total_interest;
    let time_savings_months = i64::from(snowball.total_months) - i64::from(avalanche.total_months);

    // Ties go to snowball
    let recommended = if avalanche.total_interest < snowball.total_interest {
        PaymentStrategy::Avalanche
    } else {
        PaymentStrategy::Snowball
    };

    debug!(
        recommended = recommended.as_str(),
        interest_savings = %interest_savings,
        time_savings_months,
        "Strategies compared"
    );

    Ok(StrategyComparison {
        recommendation_reason: recommendation_reason(interest_savings, time_savings_months),
        snowball,
        avalanche,
        recommended,
        interest_savings,
        time_savings_months,
    })
}

/// Compare snowball and avalanche for `debts`, starting today
pub fn compare(debts: &[Debt], extra_payment: Decimal) -> Result<StrategyComparison> {
    compare_with(&PayoffCalculator::new(extra_payment), debts)
}

fn recommendation_reason(interest_savings: Decimal, time_savings_months: i64) -> String {
    if interest_savings > LARGE_SAVINGS {
        format!(
            "Avalanche saves ${:.2} in interest and finishes {} - significant financial benefit",
            interest_savings,
            describe_months(time_savings_months)
        )
    } else if interest_savings > MODERATE_SAVINGS {
        format!(
            "Avalanche saves ${:.2} in interest with a similar timeline - moderate financial benefit",
            interest_savings
        )
    } else if time_savings_months < -MOMENTUM_MONTHS {
        format!(
            "Snowball finishes {} months sooner - early wins may help you stay on track",
            time_savings_months.abs()
        )
    } else if interest_savings > Decimal::ZERO {
        format!(
            "Avalanche saves ${:.2} in interest; the difference is small, so choose the style that keeps you motivated",
            interest_savings
        )
    } else {
        "Both strategies cost the same; snowball gives you quicker wins".to_string()
    }
}

fn describe_months(months: i64) -> String {
    match months {
        0 => "in the same time".to_string(),
        1 => "1 month sooner".to_string(),
        m if m > 0 => format!("{} months sooner", m),
        -1 => "1 month later".to_string(),
        m => format!("{} months later", -m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn calculator(extra: Decimal) -> PayoffCalculator {
        PayoffCalculator::new(extra).starting_on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    }

    #[test]
    fn test_avalanche_recommended_when_cheaper() {
        let debts = vec![
            Debt::new("Low Rate", dec!(2000), dec!(4), dec!(60)),
            Debt::new("High Rate", dec!(6000), dec!(24), dec!(180)),
        ];
        let cmp = compare_with(&calculator(dec!(200)), &debts).unwrap();

        assert!(cmp.avalanche.total_interest < cmp.snowball.total_interest);
        assert_eq!(cmp.recommended, PaymentStrategy::Avalanche);
        assert_eq!(
            cmp.interest_savings,
            cmp.snowball.total_interest - cmp.avalanche.total_interest
        );
        assert_eq!(cmp.recommended_plan().strategy, PaymentStrategy::Avalanche);
    }

    #[test]
    fn test_tie_goes_to_snowball() {
        // Same order under both strategies, so identical interest
        let debts = vec![
            Debt::new("Small", dec!(500), dec!(20), dec!(50)),
            Debt::new("Large", dec!(5000), dec!(5), dec!(100)),
        ];
        let cmp = compare_with(&calculator(dec!(100)), &debts).unwrap();

        assert_eq!(cmp.snowball.total_interest, cmp.avalanche.total_interest);
        assert_eq!(cmp.recommended, PaymentStrategy::Snowball);
        assert_eq!(cmp.interest_savings, Decimal::ZERO);
        assert_eq!(cmp.time_savings_months, 0);
    }

    #[test]
    fn test_equal_aprs_follow_strict_rule() {
        let debts = vec![
            Debt::new("A", dec!(3000), dec!(15), dec!(90)),
            Debt::new("B", dec!(800), dec!(15), dec!(40)),
        ];
        let cmp = compare_with(&calculator(dec!(50)), &debts).unwrap();

        // Equal rates differ by cent rounding at most
        assert!(cmp.interest_savings.abs() < dec!(1));
        let expected = if cmp.interest_savings > Decimal::ZERO {
            PaymentStrategy::Avalanche
        } else {
            PaymentStrategy::Snowball
        };
        assert_eq!(cmp.recommended, expected);
    }

    #[test]
    fn test_reason_thresholds() {
        assert!(recommendation_reason(dec!(750), 4).contains("significant"));
        assert!(recommendation_reason(dec!(750), 4).contains("4 months sooner"));
        assert!(recommendation_reason(dec!(150), 0).contains("moderate"));
        assert!(recommendation_reason(dec!(20), -5).contains("5 months sooner"));
        assert!(recommendation_reason(dec!(20), 0).contains("motivated"));
        assert!(recommendation_reason(Decimal::ZERO, 0).contains("same"));
    }

    #[test]
    fn test_summary_drops_schedules() {
        let debts = vec![Debt::new("Card", dec!(1200), dec!(12), dec!(200))];
        let cmp = compare_with(&calculator(Decimal::ZERO), &debts).unwrap();
        let summary = ComparisonSummary::from(&cmp);
        assert_eq!(summary.snowball_total_months, 7);
        assert_eq!(summary.avalanche_total_interest, dec!(43.85));
    }
}
