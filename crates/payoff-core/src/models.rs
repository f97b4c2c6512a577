//! Domain models for payoff planning

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single debt as supplied by the caller for one planning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Caller-supplied identifier, used by custom orderings.
    /// Falls back to the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub balance: Decimal,
    /// Annual percentage rate, in percent (0-100)
    pub apr: Decimal,
    pub minimum_payment: Decimal,
}

impl Debt {
    pub fn new(
        name: impl Into<String>,
        balance: Decimal,
        apr: Decimal,
        minimum_payment: Decimal,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            balance,
            apr,
            minimum_payment,
        }
    }

    /// Set an explicit identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Identifier used for custom orderings and plan output
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// Ordering strategy for directing extra payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStrategy {
    /// Smallest balance first
    Snowball,
    /// Highest APR first
    Avalanche,
    /// Caller-supplied explicit order
    Custom,
}

impl PaymentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snowball => "snowball",
            Self::Avalanche => "avalanche",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for PaymentStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snowball" => Ok(Self::Snowball),
            "avalanche" => Ok(Self::Avalanche),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One month of amortization for one debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationStep {
    /// 1-based month index
    pub month: u32,
    pub opening_balance: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub payment: Decimal,
    /// Never negative; exactly zero in the payoff month
    pub closing_balance: Decimal,
}

/// Per-debt outcome inside a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPayoff {
    pub id: String,
    pub name: String,
    pub starting_balance: Decimal,
    pub apr: Decimal,
    pub minimum_payment: Decimal,
    /// Month in which the balance reached zero (0 for debts already at zero)
    pub payoff_month: u32,
    pub interest_paid: Decimal,
    pub total_paid: Decimal,
    pub schedule: Vec<AmortizationStep>,
}

/// Aggregate payments across all debts for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: u32,
    /// Calendar month label (YYYY-MM)
    pub period: String,
    pub payment: Decimal,
    pub interest: Decimal,
    pub remaining_balance: Decimal,
}

/// Result of running the waterfall over a portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub strategy: PaymentStrategy,
    pub extra_payment: Decimal,
    pub starting_balance: Decimal,
    /// Max payoff month across all debts
    pub total_months: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub start_date: NaiveDate,
    pub payoff_date: NaiveDate,
    /// Debt keys in priority order
    pub priority: Vec<String>,
    /// Per-debt results, in priority order
    pub debts: Vec<DebtPayoff>,
    pub monthly_totals: Vec<MonthlyTotal>,
}

impl PayoffPlan {
    /// First debt in priority order that started with a balance
    pub fn top_debt(&self) -> Option<&DebtPayoff> {
        self.debts
            .iter()
            .find(|d| d.starting_balance > Decimal::ZERO)
            .or_else(|| self.debts.first())
    }

    /// Total paid in the first month (minimums plus extra)
    pub fn first_month_payment(&self) -> Decimal {
        self.monthly_totals
            .first()
            .map(|m| m.payment)
            .unwrap_or(Decimal::ZERO)
    }

    /// Look up a debt by key
    pub fn debt(&self, key: &str) -> Option<&DebtPayoff> {
        self.debts.iter().find(|d| d.id == key)
    }
}

/// Budget feasibility verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipResult {
    pub is_feasible: bool,
    pub monthly_budget: Decimal,
    pub total_minimum_payments: Decimal,
    pub surplus: Decimal,
    pub shortfall: Decimal,
    /// Whole currency units, multiple of the increment; zero when feasible
    pub suggestion_amount: Decimal,
    pub suggestion_text: Option<String>,
    pub message: String,
}

/// Where the user-visible nudge text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NudgeSource {
    Llm,
    Fallback,
}

impl NudgeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for NudgeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed but not yet checked LLM output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NudgeCandidate {
    pub nudge: String,
    pub cta: String,
}

/// A nudge that is safe to show to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedNudge {
    pub nudge: String,
    pub cta: String,
    pub validated: bool,
    pub source: NudgeSource,
}

impl ValidatedNudge {
    pub fn from_llm(candidate: NudgeCandidate) -> Self {
        Self {
            nudge: candidate.nudge,
            cta: candidate.cta,
            validated: true,
            source: NudgeSource::Llm,
        }
    }

    pub fn fallback(nudge: impl Into<String>, cta: impl Into<String>) -> Self {
        Self {
            nudge: nudge.into(),
            cta: cta.into(),
            validated: false,
            source: NudgeSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_debt_key_falls_back_to_name() {
        let debt = Debt::new("Visa", dec!(500), dec!(20), dec!(50));
        assert_eq!(debt.key(), "Visa");
        assert_eq!(debt.with_id("card-1").key(), "card-1");
    }

    #[test]
    fn test_strategy_round_trip() {
        assert_eq!(
            PaymentStrategy::from_str("Avalanche").unwrap(),
            PaymentStrategy::Avalanche
        );
        assert_eq!(PaymentStrategy::Snowball.to_string(), "snowball");
        assert!(PaymentStrategy::from_str("compare").is_err());
    }

    #[test]
    fn test_debt_deserializes_numbers_and_strings() {
        let debt: Debt = serde_json::from_str(
            r#"{"name": "Card", "balance": 1200, "apr": "12.5", "minimum_payment": 35.5}"#,
        )
        .unwrap();
        assert_eq!(debt.balance, dec!(1200));
        assert_eq!(debt.apr, dec!(12.5));
        assert_eq!(debt.minimum_payment, dec!(35.5));
        assert!(debt.id.is_none());
    }

    #[test]
    fn test_candidate_rejects_extra_fields() {
        let result: std::result::Result<NudgeCandidate, _> =
            serde_json::from_str(r#"{"nudge": "Hi", "cta": "Go", "extra": 1}"#);
        assert!(result.is_err());
    }
}
