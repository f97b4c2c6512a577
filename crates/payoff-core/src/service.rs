//! Request/response shapes for the routing layer
//!
//! Pure mappings from request bodies to response bodies. Transport,
//! authentication and persistence live outside this crate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::compare::{compare_with, ComparisonSummary};
use crate::config::PlannerSettings;
use crate::error::{Error, Result};
use crate::facts::FactSet;
use crate::models::{Debt, DebtPayoff, MonthlyTotal, PayoffPlan, PaymentStrategy, SlipResult, ValidatedNudge};
use crate::nudge::{FallbackContext, NudgeValidator};
use crate::planner::PayoffCalculator;
use crate::slip::{SlipDebt, SlipDetector};

/// Strategy requested for a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanMode {
    Snowball,
    Avalanche,
    Custom,
    /// Run both and return the recommended plan
    Compare,
}

impl PlanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snowball => "snowball",
            Self::Avalanche => "avalanche",
            Self::Custom => "custom",
            Self::Compare => "compare",
        }
    }
}

impl std::str::FromStr for PlanMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snowball" => Ok(Self::Snowball),
            "avalanche" => Ok(Self::Avalanche),
            "custom" => Ok(Self::Custom),
            "compare" => Ok(Self::Compare),
            _ => Err(format!(
                "Unknown strategy: {} (expected snowball, avalanche, custom or compare)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub debts: Vec<Debt>,
    pub strategy: PlanMode,
    #[serde(default)]
    pub extra_payment: Option<Decimal>,
    /// Debt keys, required when `strategy` is `custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_order: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub strategy: PaymentStrategy,
    pub total_months: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub starting_balance: Decimal,
    pub extra_payment: Decimal,
    pub payoff_date: NaiveDate,
    pub per_debt_schedule: Vec<DebtPayoff>,
    pub per_month_totals: Vec<MonthlyTotal>,
    /// Present when the request asked for a comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonSummary>,
}

impl From<PayoffPlan> for PlanResponse {
    fn from(plan: PayoffPlan) -> Self {
        Self {
            strategy: plan.strategy,
            total_months: plan.total_months,
            total_interest: plan.total_interest,
            total_paid: plan.total_paid,
            starting_balance: plan.starting_balance,
            extra_payment: plan.extra_payment,
            payoff_date: plan.payoff_date,
            per_debt_schedule: plan.debts,
            per_month_totals: plan.monthly_totals,
            comparison: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipRequest {
    pub monthly_budget: Decimal,
    pub debts: Vec<SlipDebt>,
}

pub type SlipResponse = SlipResult;

/// A model reply to check, with the facts it may quote
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NudgeRequest {
    pub candidate: String,
    pub facts: FactSet,
    /// Used only to pick a fallback template
    #[serde(default)]
    pub strategy: Option<PaymentStrategy>,
    #[serde(default)]
    pub months_remaining: Option<u32>,
}

pub type NudgeResponse = ValidatedNudge;

/// The plan a request resolves to, plus the comparison when one was run
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlan {
    pub plan: PayoffPlan,
    pub comparison: Option<ComparisonSummary>,
}

/// Run the strategy a request asks for. `compare` yields the recommended
/// plan along with its summary.
///
/// `start_date` anchors payoff dates; `None` means today.
pub fn resolve_plan(
    request: &PlanRequest,
    settings: &PlannerSettings,
    start_date: Option<NaiveDate>,
) -> Result<ResolvedPlan> {
    let mut calculator =
        PayoffCalculator::new(request.extra_payment.unwrap_or(Decimal::ZERO)).with_settings(settings);
    if let Some(date) = start_date {
        calculator = calculator.starting_on(date);
    }

    let strategy = match request.strategy {
        PlanMode::Snowball => PaymentStrategy::Snowball,
        PlanMode::Avalanche => PaymentStrategy::Avalanche,
        PlanMode::Custom => PaymentStrategy::Custom,
        PlanMode::Compare => {
            let comparison = compare_with(&calculator, &request.debts)?;
            let summary = ComparisonSummary::from(&comparison);
            let plan = match comparison.recommended {
                PaymentStrategy::Avalanche => comparison.avalanche,
                _ => comparison.snowball,
            };
            return Ok(ResolvedPlan {
                plan,
                comparison: Some(summary),
            });
        }
    };

    if strategy != PaymentStrategy::Custom && request.custom_order.is_some() {
        return Err(Error::InvalidInput(format!(
            "custom_order is only valid with the custom strategy, not {}",
            strategy
        )));
    }

    let plan = calculator.calculate(&request.debts, strategy, request.custom_order.as_deref())?;
    Ok(ResolvedPlan {
        plan,
        comparison: None,
    })
}

/// Build the plan (or comparison) a request asks for
pub fn plan(
    request: &PlanRequest,
    settings: &PlannerSettings,
    start_date: Option<NaiveDate>,
) -> Result<PlanResponse> {
    let resolved = resolve_plan(request, settings, start_date)?;
    let mut response = PlanResponse::from(resolved.plan);
    response.comparison = resolved.comparison;
    Ok(response)
}

/// Check a budget against minimum payments
pub fn check_slip(request: &SlipRequest) -> Result<SlipResponse> {
    SlipDetector::new().check(&request.debts, request.monthly_budget)
}

/// Validate a model reply; always produces a displayable nudge
pub fn validate_nudge(validator: &NudgeValidator, request: &NudgeRequest) -> NudgeResponse {
    let context = FallbackContext::new(request.strategy, request.months_remaining);
    validator
        .validate_with(&request.candidate, &request.facts, &context)
        .nudge
}
