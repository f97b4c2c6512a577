//! Payoff calculator - the snowball/avalanche "waterfall"
//!
//! Every month each open debt accrues interest and receives its minimum
//! payment. The extra payment, plus the minimums of every debt already
//! retired, goes to the first open debt in priority order; whatever that
//! debt does not need spills to the next one.
//!
//! The loop here does not drive one [`Amortization`](crate::amortization::Amortization)
//! per debt: those iterators assume a fixed payment, while a debt's payment
//! in the waterfall changes from month to month as the pool cascades. The
//! per-month arithmetic is shared instead through
//! [`AmortizationStep::settle`], [`monthly_interest`] and [`check_convergence`],
//! so a single-debt plan reproduces [`amortize`](crate::amortization::amortize)
//! step for step.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use payoff_core::planner::PayoffCalculator;
//! use payoff_core::models::PaymentStrategy;
//!
//! let calculator = PayoffCalculator::new(dec!(100));
//! let plan = calculator.calculate(&debts, PaymentStrategy::Avalanche, None)?;
//! println!("Debt-free in {} months", plan.total_months);
//! ```

use std::collections::HashSet;
use std::time::Instant;

use chrono::{Local, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info};

use crate::amortization::{check_convergence, MAX_MONTHS};
use crate::config::PlannerSettings;
use crate::error::{Error, Result};
use crate::models::{AmortizationStep, Debt, DebtPayoff, MonthlyTotal, PayoffPlan, PaymentStrategy};
use crate::money::{check_amount, monthly_interest, MAX_AMOUNT};

/// Documented portfolio size ceiling
pub const MAX_DEBTS: usize = 10;

/// Longest accepted debt name
pub const MAX_NAME_LEN: usize = 100;

const MAX_APR: Decimal = dec!(100);

/// Check a portfolio against the planner's input rules.
///
/// Every problem is collected; the error message lists all of them.
pub fn validate_portfolio(debts: &[Debt], max_debts: usize) -> Result<()> {
    if debts.is_empty() {
        return Err(Error::InvalidInput("At least one debt is required".into()));
    }

    let mut errors = Vec::new();

    if debts.len() > max_debts {
        errors.push(format!("Maximum {} debts supported", max_debts));
    }

    for (i, debt) in debts.iter().enumerate() {
        let prefix = format!("Debt {}", i + 1);

        let name = debt.name.trim();
        if name.is_empty() {
            errors.push(format!("{}: Name cannot be empty", prefix));
        } else if debt.name.chars().count() > MAX_NAME_LEN {
            errors.push(format!(
                "{}: Name exceeds {} characters",
                prefix, MAX_NAME_LEN
            ));
        }

        if debt.balance < Decimal::ZERO {
            errors.push(format!("{}: Balance cannot be negative", prefix));
        } else if debt.balance > MAX_AMOUNT {
            errors.push(format!("{}: Balance cannot exceed {}", prefix, MAX_AMOUNT));
        }

        if debt.apr < Decimal::ZERO || debt.apr > MAX_APR {
            errors.push(format!("{}: APR must be between 0-100%", prefix));
        }

        if debt.minimum_payment < Decimal::ZERO {
            errors.push(format!("{}: Minimum payment cannot be negative", prefix));
        } else if debt.minimum_payment > MAX_AMOUNT {
            errors.push(format!(
                "{}: Minimum payment cannot exceed {}",
                prefix, MAX_AMOUNT
            ));
        } else if debt.minimum_payment.is_zero() && debt.balance > Decimal::ZERO {
            errors.push(format!(
                "{}: Minimum payment may only be zero for a zero balance",
                prefix
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput(errors.join("; ")))
    }
}

/// Order debt indices by strategy. Ties keep input order.
pub fn priority_order(
    debts: &[Debt],
    strategy: PaymentStrategy,
    custom_order: Option<&[String]>,
) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..debts.len()).collect();

    match strategy {
        PaymentStrategy::Snowball => {
            order.sort_by(|&a, &b| debts[a].balance.cmp(&debts[b].balance));
        }
        PaymentStrategy::Avalanche => {
            order.sort_by(|&a, &b| debts[b].apr.cmp(&debts[a].apr));
        }
        PaymentStrategy::Custom => {
            let custom = custom_order.ok_or_else(|| {
                Error::InvalidInput("Custom strategy requires an explicit debt order".into())
            })?;
            order = custom_permutation(debts, custom)?;
        }
    }

    Ok(order)
}

fn custom_permutation(debts: &[Debt], custom: &[String]) -> Result<Vec<usize>> {
    let mut keys = HashSet::new();
    for debt in debts {
        if !keys.insert(debt.key()) {
            return Err(Error::InvalidInput(format!(
                "Duplicate debt id '{}' cannot be ordered",
                debt.key()
            )));
        }
    }

    if custom.len() != debts.len() {
        return Err(Error::InvalidInput(format!(
            "Custom order lists {} debts, expected {}",
            custom.len(),
            debts.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(custom.len());
    for key in custom {
        if !seen.insert(key.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Custom order repeats debt '{}'",
                key
            )));
        }
        let index = debts
            .iter()
            .position(|d| d.key() == key)
            .ok_or_else(|| Error::InvalidInput(format!("Custom order names unknown debt '{}'", key)))?;
        order.push(index);
    }

    Ok(order)
}

/// Working state for one debt during simulation
struct Ledger<'a> {
    debt: &'a Debt,
    balance: Decimal,
    payoff_month: Option<u32>,
    steps: Vec<AmortizationStep>,
}

impl Ledger<'_> {
    fn is_open(&self) -> bool {
        self.balance > Decimal::ZERO
    }
}

/// Payment pending for one open debt within the current month
struct Pending {
    index: usize,
    opening: Decimal,
    interest: Decimal,
    payment: Decimal,
}

/// Core payoff engine
#[derive(Debug, Clone)]
pub struct PayoffCalculator {
    extra_payment: Decimal,
    start_date: NaiveDate,
    max_debts: usize,
    max_months: u32,
}

impl PayoffCalculator {
    /// Create a calculator starting today
    pub fn new(extra_payment: Decimal) -> Self {
        Self {
            extra_payment,
            start_date: Local::now().date_naive(),
            max_debts: MAX_DEBTS,
            max_months: MAX_MONTHS,
        }
    }

    /// Anchor payoff dates to a fixed start date
    pub fn starting_on(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Apply limits from configuration
    pub fn with_settings(mut self, settings: &PlannerSettings) -> Self {
        self.max_debts = settings.max_debts;
        self.max_months = settings.max_months;
        self
    }

    pub fn extra_payment(&self) -> Decimal {
        self.extra_payment
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn calculate_snowball(&self, debts: &[Debt]) -> Result<PayoffPlan> {
        self.calculate(debts, PaymentStrategy::Snowball, None)
    }

    pub fn calculate_avalanche(&self, debts: &[Debt]) -> Result<PayoffPlan> {
        self.calculate(debts, PaymentStrategy::Avalanche, None)
    }

    /// Run the waterfall for `debts` under `strategy`.
    ///
    /// `custom_order` lists debt keys and is required for
    /// [`PaymentStrategy::Custom`]; it is ignored otherwise.
    pub fn calculate(
        &self,
        debts: &[Debt],
        strategy: PaymentStrategy,
        custom_order: Option<&[String]>,
    ) -> Result<PayoffPlan> {
        let started = Instant::now();

        if self.extra_payment < Decimal::ZERO {
            return Err(Error::InvalidInput(
                "Extra payment cannot be negative".into(),
            ));
        }
        check_amount("Extra payment", self.extra_payment)?;
        validate_portfolio(debts, self.max_debts)?;
        let order = priority_order(debts, strategy, custom_order)?;

        for debt in debts {
            check_convergence(debt, debt.minimum_payment)?;
        }

        let mut ledgers: Vec<Ledger> = order
            .iter()
            .map(|&i| {
                let debt = &debts[i];
                Ledger {
                    debt,
                    balance: debt.balance,
                    payoff_month: if debt.balance.is_zero() { Some(0) } else { None },
                    steps: Vec::new(),
                }
            })
            .collect();

        let mut monthly_totals = Vec::new();
        let mut rolled_over = Decimal::ZERO;
        let mut month = 0u32;

        while ledgers.iter().any(Ledger::is_open) {
            if month >= self.max_months {
                let stuck = ledgers
                    .iter()
                    .find(|l| l.is_open())
                    .map(|l| l.debt.name.clone())
                    .unwrap_or_default();
                return Err(Error::NonConvergentPayment {
                    debt: stuck,
                    reason: format!("not paid off within {} months", self.max_months),
                });
            }
            month += 1;

            // Interest and minimums; unused minimum joins the pool
            let mut pool = self.extra_payment + rolled_over;
            let mut pending = Vec::new();
            for (index, ledger) in ledgers.iter().enumerate() {
                if !ledger.is_open() {
                    continue;
                }
                let interest = monthly_interest(ledger.balance, ledger.debt.apr)?;
                let owed = ledger.balance + interest;
                let payment = ledger.debt.minimum_payment.min(owed);
                pool += ledger.debt.minimum_payment - payment;
                pending.push(Pending {
                    index,
                    opening: ledger.balance,
                    interest,
                    payment,
                });
            }

            // Pool to the first open debts in priority order
            for entry in pending.iter_mut() {
                if pool <= Decimal::ZERO {
                    break;
                }
                let outstanding = entry.opening + entry.interest - entry.payment;
                let applied = pool.min(outstanding);
                entry.payment += applied;
                pool -= applied;
            }

            let mut month_payment = Decimal::ZERO;
            let mut month_interest = Decimal::ZERO;
            for entry in pending {
                let step =
                    AmortizationStep::settle(month, entry.opening, entry.interest, entry.payment);
                month_payment += step.payment;
                month_interest += step.interest;

                let ledger = &mut ledgers[entry.index];
                ledger.balance = step.closing_balance;
                if step.closing_balance.is_zero() {
                    ledger.payoff_month = Some(month);
                    // Freed minimum is available from next month on
                    rolled_over += ledger.debt.minimum_payment;
                    debug!(debt = %ledger.debt.name, month, "Debt retired");
                }
                ledger.steps.push(step);
            }

            monthly_totals.push(MonthlyTotal {
                month,
                period: self.period_label(month)?,
                payment: month_payment,
                interest: month_interest,
                remaining_balance: ledgers.iter().map(|l| l.balance).sum(),
            });
        }

        let total_months = month;
        let payoff_date = self.add_months(total_months)?;

        let debts_out: Vec<DebtPayoff> = ledgers
            .into_iter()
            .map(|ledger| {
                let interest_paid = ledger.steps.iter().map(|s| s.interest).sum();
                let total_paid = ledger.steps.iter().map(|s| s.payment).sum();
                DebtPayoff {
                    id: ledger.debt.key().to_string(),
                    name: ledger.debt.name.clone(),
                    starting_balance: ledger.debt.balance,
                    apr: ledger.debt.apr,
                    minimum_payment: ledger.debt.minimum_payment,
                    payoff_month: ledger.payoff_month.unwrap_or(total_months),
                    interest_paid,
                    total_paid,
                    schedule: ledger.steps,
                }
            })
            .collect();

        let total_interest: Decimal = debts_out.iter().map(|d| d.interest_paid).sum();
        let total_paid: Decimal = debts_out.iter().map(|d| d.total_paid).sum();

        let plan = PayoffPlan {
            strategy,
            extra_payment: self.extra_payment,
            starting_balance: debts.iter().map(|d| d.balance).sum(),
            total_months,
            total_interest,
            total_paid,
            start_date: self.start_date,
            payoff_date,
            priority: debts_out.iter().map(|d| d.id.clone()).collect(),
            debts: debts_out,
            monthly_totals,
        };

        info!(
            strategy = strategy.as_str(),
            debts = debts.len(),
            months = plan.total_months,
            total_interest = %plan.total_interest,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Payoff plan calculated"
        );

        Ok(plan)
    }

    fn add_months(&self, months: u32) -> Result<NaiveDate> {
        self.start_date
            .checked_add_months(Months::new(months))
            .ok_or_else(|| Error::InvalidInput(format!("Payoff date out of range ({} months)", months)))
    }

    fn period_label(&self, month: u32) -> Result<String> {
        Ok(self.add_months(month)?.format("%Y-%m").to_string())
    }
}

/// Calculate a plan starting today
pub fn calculate(
    debts: &[Debt],
    strategy: PaymentStrategy,
    extra_payment: Decimal,
    custom_order: Option<&[String]>,
) -> Result<PayoffPlan> {
    PayoffCalculator::new(extra_payment).calculate(debts, strategy, custom_order)
}
