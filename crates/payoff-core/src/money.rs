//! Currency rounding and canonical number formatting
//!
//! One rounding mode is used everywhere: half away from zero at the cent.
//! For the non-negative amounts handled here that is plain "round half up".
//!
//! Canonical strings are what the fact registry stores and what extracted
//! tokens are compared against. Amounts carry exactly two fraction digits,
//! rates exactly one, always in fixed notation:
//!
//! ```text
//! 5000      -> "5000.00"
//! $5,000.00 -> "5000.00"
//! 19.99%    -> (no canonical form, too precise for a rate)
//! 20%       -> "20.0"
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Fraction digits for currency amounts
pub const CURRENCY_SCALE: u32 = 2;

/// Fraction digits for percentages / rates
pub const RATE_SCALE: u32 = 1;

/// Largest balance, payment or budget the planner accepts (one trillion).
/// Keeps every product and running total well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

const MONTHS_PER_YEAR_PERCENT: Decimal = dec!(1200);

/// Round to whole cents, half up
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// One month of interest on `balance` at `apr` percent, rounded to the cent.
///
/// Fails with [`Error::InvalidInput`] instead of overflowing.
pub fn monthly_interest(balance: Decimal, apr: Decimal) -> Result<Decimal> {
    balance
        .checked_mul(apr)
        .and_then(|product| product.checked_div(MONTHS_PER_YEAR_PERCENT))
        .map(round_currency)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Interest on {} at {}% is out of range",
                balance, apr
            ))
        })
}

/// Reject amounts above [`MAX_AMOUNT`], naming the field in the error
pub fn check_amount(label: &str, amount: Decimal) -> Result<()> {
    if amount > MAX_AMOUNT {
        return Err(Error::InvalidInput(format!(
            "{} cannot exceed {}",
            label, MAX_AMOUNT
        )));
    }
    Ok(())
}

/// Render `value` with exactly `scale` fraction digits
fn fixed(value: Decimal, scale: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded.to_string()
}

/// What kind of quantity a number represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    /// Currency amounts and plain counts (two fraction digits)
    Amount,
    /// Percentages (one fraction digit)
    Rate,
}

impl NumberKind {
    pub fn scale(&self) -> u32 {
        match self {
            NumberKind::Amount => CURRENCY_SCALE,
            NumberKind::Rate => RATE_SCALE,
        }
    }
}

/// A number in canonical fixed-point form. Serializes as its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Canonical {
    kind: NumberKind,
    text: String,
}

impl Canonical {
    /// Canonical form of a currency amount
    pub fn amount(value: Decimal) -> Self {
        Self {
            kind: NumberKind::Amount,
            text: fixed(value, CURRENCY_SCALE),
        }
    }

    /// Canonical form of a percentage
    pub fn rate(value: Decimal) -> Self {
        Self {
            kind: NumberKind::Rate,
            text: fixed(value, RATE_SCALE),
        }
    }

    /// Canonical form of a whole count (months, etc.)
    pub fn count(value: u32) -> Self {
        Self::amount(Decimal::from(value))
    }

    /// Canonicalize a raw token such as `$5,000.00`, `12` or `20%`.
    ///
    /// Only ASCII digits, one decimal point, thousands commas and the `$`/`%`
    /// markers are allowed. Returns `None` for anything else, and for tokens
    /// carrying more fraction digits than their kind allows; such tokens can
    /// never match.
    pub fn parse(raw: &str, kind: NumberKind) -> Option<Self> {
        let mut cleaned = String::with_capacity(raw.len());
        for c in raw.trim().chars() {
            match c {
                '0'..='9' | '.' => cleaned.push(c),
                ',' | '$' | '%' | ' ' => {}
                _ => return None,
            }
        }
        if !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if cleaned.starts_with('.') {
            cleaned.insert(0, '0');
        }

        let value = Decimal::from_str(&cleaned).ok()?.normalize();
        if value.scale() > kind.scale() {
            return None;
        }

        Some(Self {
            kind,
            text: fixed(value, kind.scale()),
        })
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Serialize for Canonical {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
