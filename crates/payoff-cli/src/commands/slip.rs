//! Slip check command implementation

use anyhow::{Context, Result};
use payoff_core::{Debt, SlipDetector};
use rust_decimal::Decimal;

use super::{money, truncate};

/// Check a monthly budget against the minimum payments
pub fn cmd_slip(debts: &[Debt], budget: Decimal, json: bool) -> Result<()> {
    let result = SlipDetector::new()
        .check(debts, budget)
        .context("Failed to check budget")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("🧮 Budget check");
    println!("   ─────────────────────────────");
    for debt in debts {
        println!(
            "   {:<24} {:>12}",
            truncate(&debt.name, 24),
            money(debt.minimum_payment)
        );
    }
    println!("   {:<24} {:>12}", "Total minimums", money(result.total_minimum_payments));
    println!("   {:<24} {:>12}", "Monthly budget", money(result.monthly_budget));
    println!();

    if result.is_feasible {
        println!("✅ {}", result.message);
        if result.surplus > Decimal::ZERO {
            println!(
                "   {} left over each month can go toward extra payments",
                money(result.surplus)
            );
        }
    } else {
        println!("⚠️  {}", result.message);
        if let Some(ref text) = result.suggestion_text {
            println!("   👉 {}", text);
        }
    }

    Ok(())
}
