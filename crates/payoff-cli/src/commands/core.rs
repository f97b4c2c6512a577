//! Shared utilities for command implementations
//!
//! This module contains:
//! - `load_config` - Resolve the effective configuration
//! - `read_debts` / `plan_request` - Parse a debts file into core types
//! - `parse_start` - Parse the optional plan start date
//! - `resolve_plan` - Run the requested strategy and return the full plan

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use payoff_core::money::round_currency;
use payoff_core::{service, Debt, PayoffConfig, PayoffPlan, PlanMode, PlanRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

/// Accepted shapes of a debts file
#[derive(Deserialize)]
#[serde(untagged)]
enum DebtFile {
    Debts(Vec<Debt>),
    Request(RequestFile),
}

/// A plan request where everything but the debts is optional
#[derive(Deserialize)]
struct RequestFile {
    debts: Vec<Debt>,
    #[serde(default)]
    strategy: Option<PlanMode>,
    #[serde(default)]
    extra_payment: Option<Decimal>,
    #[serde(default)]
    custom_order: Option<Vec<String>>,
}

impl From<DebtFile> for RequestFile {
    fn from(file: DebtFile) -> Self {
        match file {
            DebtFile::Debts(debts) => RequestFile {
                debts,
                strategy: None,
                extra_payment: None,
                custom_order: None,
            },
            DebtFile::Request(request) => request,
        }
    }
}

/// Explicit `--config` path, else the data dir override, else built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<PayoffConfig> {
    debug!(path = ?path, "Loading config");
    match path {
        Some(path) => PayoffConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => PayoffConfig::load().context("Failed to load config"),
    }
}

fn read_file(path: &Path) -> Result<RequestFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: DebtFile = serde_json::from_str(&content).with_context(|| {
        format!(
            "{} is not a debts array or a plan request object",
            path.display()
        )
    })?;
    Ok(file.into())
}

/// Read the debts from a debts file
pub fn read_debts(path: &Path) -> Result<Vec<Debt>> {
    Ok(read_file(path)?.debts)
}

/// Build a plan request from a debts file, with flags taking precedence.
///
/// `--order` without `--strategy` implies the custom strategy. With neither
/// in the file nor on the command line, both strategies are compared.
pub fn plan_request(
    path: &Path,
    strategy: Option<&str>,
    extra: Option<Decimal>,
    order: Option<Vec<String>>,
) -> Result<PlanRequest> {
    let file = read_file(path)?;

    let strategy = match strategy {
        Some(s) => s.parse::<PlanMode>().map_err(|e: String| anyhow!(e))?,
        None if order.is_some() => PlanMode::Custom,
        None => file.strategy.unwrap_or(PlanMode::Compare),
    };

    Ok(PlanRequest {
        debts: file.debts,
        strategy,
        extra_payment: extra.or(file.extra_payment),
        custom_order: order.or(file.custom_order),
    })
}

/// Parse `--start`, if given
pub fn parse_start(start: Option<&str>) -> Result<Option<NaiveDate>> {
    start
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --start date format (use YYYY-MM-DD)")
}

/// Run the requested strategy. `compare` yields the recommended plan.
pub fn resolve_plan(
    request: &PlanRequest,
    config: &PayoffConfig,
    start: Option<NaiveDate>,
) -> Result<PayoffPlan> {
    let resolved = service::resolve_plan(request, &config.planner, start)
        .context("Failed to build payoff plan")?;
    debug!(
        strategy = %resolved.plan.strategy,
        months = resolved.plan.total_months,
        compared = resolved.comparison.is_some(),
        "Resolved plan"
    );
    Ok(resolved.plan)
}

/// Format an amount for display, e.g. `$1,234.50`
pub fn money(amount: Decimal) -> String {
    let fixed = format!("{:.2}", round_currency(amount.abs()));
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// "1 month", "14 months"
pub fn months(count: u32) -> String {
    if count == 1 {
        "1 month".to_string()
    } else {
        format!("{} months", count)
    }
}
