//! Plan and compare command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use payoff_core::{
    compare_with, service, ComparisonSummary, Debt, PayoffCalculator, PayoffConfig, PlanRequest,
    PlanResponse,
};
use rust_decimal::Decimal;

use super::{money, months, truncate};

/// Build and print a payoff plan
pub fn cmd_plan(
    request: &PlanRequest,
    config: &PayoffConfig,
    start: Option<NaiveDate>,
    schedule: bool,
    json: bool,
) -> Result<()> {
    let response =
        service::plan(request, &config.planner, start).context("Failed to build payoff plan")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    print_plan(&response);

    if let Some(ref comparison) = response.comparison {
        println!();
        print_comparison(comparison);
    }

    if schedule {
        println!();
        print_schedule(&response);
    }

    Ok(())
}

/// Run both strategies and print them side by side
pub fn cmd_compare(
    debts: &[Debt],
    extra: Decimal,
    config: &PayoffConfig,
    start: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let mut calculator = PayoffCalculator::new(extra).with_settings(&config.planner);
    if let Some(date) = start {
        calculator = calculator.starting_on(date);
    }

    let comparison =
        compare_with(&calculator, debts).context("Failed to compare payoff strategies")?;
    let summary = ComparisonSummary::from(&comparison);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("⚖️  Snowball vs Avalanche");
    println!("   Extra payment: {}/month", money(extra));
    println!();
    println!("{:<12} {:>10} {:>14} {:>10}", "STRATEGY", "MONTHS", "INTEREST", "DEBT-FREE");
    println!("{}", "-".repeat(50));
    for plan in [&comparison.snowball, &comparison.avalanche] {
        println!(
            "{:<12} {:>10} {:>14} {:>10}",
            plan.strategy.as_str(),
            plan.total_months,
            money(plan.total_interest),
            plan.payoff_date.format("%Y-%m").to_string()
        );
    }
    println!();
    print_comparison(&summary);

    Ok(())
}

fn print_plan(response: &PlanResponse) {
    println!("📋 Payoff plan ({})", response.strategy);
    println!("   ─────────────────────────────");
    println!("   Total debt:      {}", money(response.starting_balance));
    println!("   Extra payment:   {}/month", money(response.extra_payment));
    println!(
        "   Debt-free in:    {} ({})",
        months(response.total_months),
        response.payoff_date.format("%B %Y")
    );
    println!("   Total interest:  {}", money(response.total_interest));
    println!("   Total paid:      {}", money(response.total_paid));
    println!();

    println!(
        "{:<3} {:<24} {:>12} {:>7} {:>9} {:>12}",
        "#", "DEBT", "BALANCE", "APR", "PAID OFF", "INTEREST"
    );
    println!("{}", "-".repeat(72));
    for (i, debt) in response.per_debt_schedule.iter().enumerate() {
        println!(
            "{:<3} {:<24} {:>12} {:>6}% {:>9} {:>12}",
            i + 1,
            truncate(&debt.name, 24),
            money(debt.starting_balance),
            debt.apr,
            format!("month {}", debt.payoff_month),
            money(debt.interest_paid)
        );
    }
}

fn print_comparison(summary: &ComparisonSummary) {
    println!("💡 Recommended: {}", summary.recommended);
    println!("   {}", summary.recommendation_reason);
    if summary.interest_savings > Decimal::ZERO {
        println!(
            "   Avalanche saves {} in interest",
            money(summary.interest_savings)
        );
    }
}

fn print_schedule(response: &PlanResponse) {
    println!(
        "{:<6} {:<8} {:>12} {:>10} {:>14}",
        "MONTH", "PERIOD", "PAYMENT", "INTEREST", "REMAINING"
    );
    println!("{}", "-".repeat(54));
    for total in &response.per_month_totals {
        println!(
            "{:<6} {:<8} {:>12} {:>10} {:>14}",
            total.month,
            total.period,
            money(total.payment),
            money(total.interest),
            money(total.remaining_balance)
        );
    }
}
