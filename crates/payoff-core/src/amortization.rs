//! Month-by-month amortization of a single debt
//!
//! [`amortize`] returns a lazy, finite iterator of [`AmortizationStep`]s. It
//! stops when the balance reaches zero or after the month ceiling, whichever
//! comes first. A payment that does not exceed the first month's interest is
//! refused up front instead of being simulated.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{AmortizationStep, Debt};
use crate::money::{check_amount, monthly_interest};

/// Hard ceiling on simulated months (100 years)
pub const MAX_MONTHS: u32 = 1200;

impl AmortizationStep {
    /// Apply one month: accrue interest on `opening`, then pay at most
    /// `opening + interest`. The closing balance is never negative.
    pub fn settle(month: u32, opening: Decimal, interest: Decimal, payment: Decimal) -> Self {
        let owed = opening + interest;
        let payment = payment.min(owed).max(Decimal::ZERO);
        Self {
            month,
            opening_balance: opening,
            interest,
            principal: payment - interest,
            payment,
            closing_balance: owed - payment,
        }
    }
}

/// Refuse payments that cannot outpace interest on a non-zero balance
pub fn check_convergence(debt: &Debt, monthly_payment: Decimal) -> Result<()> {
    if debt.balance <= Decimal::ZERO {
        return Ok(());
    }

    let interest = monthly_interest(debt.balance, debt.apr)?;
    if monthly_payment <= interest {
        return Err(Error::NonConvergentPayment {
            debt: debt.name.clone(),
            reason: format!(
                "monthly payment {} does not exceed monthly interest {}",
                monthly_payment, interest
            ),
        });
    }

    Ok(())
}

/// Lazy schedule for one debt at a fixed monthly payment
#[derive(Debug, Clone)]
pub struct Amortization {
    name: String,
    balance: Decimal,
    apr: Decimal,
    payment: Decimal,
    month: u32,
    ceiling: u32,
}

/// Start amortizing `debt` at `monthly_payment`.
///
/// Fails with [`Error::NonConvergentPayment`] when the payment does not exceed
/// the first month's interest.
pub fn amortize(debt: &Debt, monthly_payment: Decimal) -> Result<Amortization> {
    if monthly_payment < Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "Monthly payment for '{}' cannot be negative",
            debt.name
        )));
    }
    check_amount(&format!("Balance of '{}'", debt.name), debt.balance)?;
    check_amount(&format!("Monthly payment for '{}'", debt.name), monthly_payment)?;
    check_convergence(debt, monthly_payment)?;

    Ok(Amortization {
        name: debt.name.clone(),
        balance: debt.balance.max(Decimal::ZERO),
        apr: debt.apr,
        payment: monthly_payment,
        month: 0,
        ceiling: MAX_MONTHS,
    })
}

impl Amortization {
    /// Override the month ceiling
    pub fn with_ceiling(mut self, months: u32) -> Self {
        self.ceiling = months;
        self
    }

    /// Balance still owed after the steps produced so far
    pub fn remaining_balance(&self) -> Decimal {
        self.balance
    }

    /// Collect the full schedule, failing if the ceiling cuts it short
    pub fn into_schedule(mut self) -> Result<Vec<AmortizationStep>> {
        let steps: Vec<AmortizationStep> = self.by_ref().collect();
        if self.balance > Decimal::ZERO {
            return Err(Error::NonConvergentPayment {
                debt: self.name,
                reason: format!("not paid off within {} months", self.ceiling),
            });
        }
        Ok(steps)
    }
}

impl Iterator for Amortization {
    type Item = AmortizationStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.balance <= Decimal::ZERO || self.month >= self.ceiling {
            return None;
        }

        // The balance only shrinks after the convergence check, so interest
        // on it stays in range
        let interest = monthly_interest(self.balance, self.apr).ok()?;
        self.month += 1;
        let step = AmortizationStep::settle(self.month, self.balance, interest, self.payment);
        self.balance = step.closing_balance;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.balance <= Decimal::ZERO {
            (0, Some(0))
        } else {
            (1, Some(self.ceiling.saturating_sub(self.month) as usize))
        }
    }
}
