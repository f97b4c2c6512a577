//! Payoff Core Library
//!
//! Debt payoff planning with a guarded AI coach:
//! - Exact, cent-rounded amortization of single debts
//! - Snowball / avalanche / custom payoff plans with minimum roll-up
//! - Strategy comparison and recommendation
//! - Budget slip detection with quantized remediation
//! - Fact registry and nudge validator so model output never quotes a
//!   number this crate did not compute
//! - Pluggable LLM backends (Ollama, OpenAI-compatible, mock)

pub mod ai;
pub mod amortization;
pub mod coach;
pub mod compare;
pub mod config;
pub mod error;
pub mod facts;
pub mod models;
pub mod money;
pub mod nudge;
pub mod planner;
pub mod service;
pub mod slip;

pub use ai::{
    CoachBackend, CoachClient, GenerateOptions, MockBackend, OllamaBackend,
    OpenAICompatibleBackend,
};
pub use amortization::{amortize, check_convergence, Amortization, MAX_MONTHS};
pub use coach::NudgeCoach;
pub use compare::{compare, compare_with, ComparisonSummary, StrategyComparison};
pub use config::{CoachSettings, PayoffConfig, PlannerSettings};
pub use error::{Error, Result};
pub use facts::{Fact, FactRegistry, FactSet};
pub use models::{
    AmortizationStep, Debt, DebtPayoff, MonthlyTotal, NudgeCandidate, NudgeSource, PayoffPlan,
    PaymentStrategy, SlipResult, ValidatedNudge,
};
pub use money::{Canonical, NumberKind};
pub use nudge::{
    FallbackContext, FallbackLibrary, NudgeValidator, RejectReason, ValidationState,
    ValidationStats, Verdict,
};
pub use planner::{validate_portfolio, PayoffCalculator, MAX_DEBTS};
pub use service::{
    resolve_plan, NudgeRequest, NudgeResponse, PlanMode, PlanRequest, PlanResponse, ResolvedPlan,
    SlipRequest, SlipResponse,
};
pub use slip::{MinimumPayment, SlipDebt, SlipDetector};
