//! Unit conversion between currency amounts and solver units
//!
//! The solver only sees signed integers. Callers scale currency into minor
//! units before solving and convert back for display afterwards, never the
//! other way round.

use crate::{types::*, Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest supported number of decimal places
const MAX_MINOR_UNITS: u32 = 18;

/// Decimal currency scale (2 = cents/agorot)
///
/// `minor_units` never exceeds 18, so the scaling factor fits in an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMoneyScale")]
pub struct MoneyScale {
    minor_units: u32,
}

#[derive(Deserialize)]
struct RawMoneyScale {
    minor_units: u32,
}

impl TryFrom<RawMoneyScale> for MoneyScale {
    type Error = Error;

    fn try_from(raw: RawMoneyScale) -> Result<Self> {
        Self::new(raw.minor_units)
    }
}

impl Default for MoneyScale {
    fn default() -> Self {
        Self { minor_units: 2 }
    }
}

impl MoneyScale {
    /// Create new scale
    pub fn new(minor_units: u32) -> Result<Self> {
        if minor_units > MAX_MINOR_UNITS {
            return Err(Error::Config(format!(
                "minor_units {} exceeds maximum {}",
                minor_units, MAX_MINOR_UNITS
            )));
        }
        Ok(Self { minor_units })
    }

    /// Decimal places kept when converting to integer units
    pub fn minor_units(&self) -> u32 {
        self.minor_units
    }

    fn factor(&self) -> Decimal {
        Decimal::from(10i64.pow(self.minor_units))
    }

    /// Convert a currency amount to integer units, exactly
    pub fn to_units(&self, amount: Decimal) -> Result<i64> {
        let scaled = amount
            .checked_mul(self.factor())
            .ok_or_else(|| Error::AmountOverflow(format!("scaling {}", amount)))?;

        if !scaled.fract().is_zero() {
            return Err(Error::NonIntegralAmount(format!(
                "{} has more than {} decimal places",
                amount, self.minor_units
            )));
        }

        scaled
            .to_i64()
            .ok_or_else(|| Error::AmountOverflow(format!("{} does not fit in i64 units", amount)))
    }

    /// Convert integer units back to a currency amount
    pub fn to_display(&self, units: i64) -> Decimal {
        Decimal::new(units, self.minor_units)
    }
}

/// Chips handed out per unit of currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipRate {
    /// Chips per currency unit (e.g. 2 chips = 1 shekel)
    pub chips_per_currency_unit: u32,
}

impl Default for ChipRate {
    fn default() -> Self {
        Self {
            chips_per_currency_unit: 1,
        }
    }
}

impl ChipRate {
    /// Create new chip rate
    pub fn new(chips_per_currency_unit: u32) -> Result<Self> {
        if chips_per_currency_unit == 0 {
            return Err(Error::Config(
                "chips_per_currency_unit must be positive".to_string(),
            ));
        }
        Ok(Self {
            chips_per_currency_unit,
        })
    }

    /// Currency value of a chip amount
    pub fn to_currency(&self, chips: i64) -> Result<Decimal> {
        if self.chips_per_currency_unit == 0 {
            return Err(Error::Config(
                "chips_per_currency_unit must be positive".to_string(),
            ));
        }
        Ok(Decimal::from(chips) / Decimal::from(self.chips_per_currency_unit))
    }
}

/// Transaction with its amount expressed in currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTransaction {
    /// Participant who pays
    pub debtor: ParticipantId,

    /// Participant who receives
    pub creditor: ParticipantId,

    /// Currency amount
    pub amount: Decimal,
}

/// Convert chip transactions for display
pub fn chips_to_display(
    transactions: &[Transaction],
    rate: ChipRate,
) -> Result<Vec<DisplayTransaction>> {
    transactions
        .iter()
        .map(|tx| {
            Ok(DisplayTransaction {
                debtor: tx.debtor.clone(),
                creditor: tx.creditor.clone(),
                amount: rate.to_currency(tx.amount)?,
            })
        })
        .collect()
}

/// Convert minor-unit transactions for display
pub fn units_to_display(
    transactions: &[Transaction],
    scale: MoneyScale,
) -> Vec<DisplayTransaction> {
    transactions
        .iter()
        .map(|tx| DisplayTransaction {
            debtor: tx.debtor.clone(),
            creditor: tx.creditor.clone(),
            amount: scale.to_display(tx.amount),
        })
        .collect()
}
