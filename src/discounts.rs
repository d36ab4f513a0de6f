//! Discounts
//!
//! Discount definitions and the minor-unit arithmetic shared by every
//! pricing mode.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The reduction a discount applies to a price.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DiscountValue<'a> {
    /// Apply a percentage discount (e.g., "20% off")
    PercentageOff(Percentage),

    /// Subtract a fixed amount from the price, never going below zero (e.g., "$10 off")
    AmountOff(Money<'a, Currency>),
}

/// A named discount
#[derive(Debug, Clone, PartialEq)]
pub struct Discount<'a> {
    /// Discount name (e.g., "Weekend Special")
    pub name: String,

    /// Discount value
    pub value: DiscountValue<'a>,
}

impl<'a> Discount<'a> {
    /// Create a percentage discount. `percent` is a fraction, so `0.2` is 20% off.
    pub fn percentage_off(name: impl Into<String>, percent: Percentage) -> Self {
        Self {
            name: name.into(),
            value: DiscountValue::PercentageOff(percent),
        }
    }

    /// Create a fixed amount discount
    pub fn amount_off(name: impl Into<String>, amount: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            value: DiscountValue::AmountOff(amount),
        }
    }

    /// Percentage as percent points (e.g., `20` for 20%), or `None` for fixed amounts.
    pub fn percent_points(&self) -> Option<Decimal> {
        match self.value {
            DiscountValue::PercentageOff(percent) => Some(fraction(percent) * Decimal::ONE_HUNDRED),
            DiscountValue::AmountOff(_) => None,
        }
    }
}

/// Active discounts, partitioned by whether they combine with each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountCatalog<'a> {
    /// Discounts whose percentages are summed into one combined rate
    pub stackable: Vec<Discount<'a>>,

    /// Mutually exclusive discounts; only the best one is ever applied
    pub non_stackable: Vec<Discount<'a>>,
}

impl<'a> DiscountCatalog<'a> {
    /// Create a new discount catalog
    pub fn new(stackable: Vec<Discount<'a>>, non_stackable: Vec<Discount<'a>>) -> Self {
        Self {
            stackable,
            non_stackable,
        }
    }
}

/// The underlying fraction of a percentage (e.g., `0.25` for 25%).
pub(crate) fn fraction(percent: Percentage) -> Decimal {
    // decimal_percentage doesn't expose the inner Decimal
    percent * Decimal::ONE
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if the percentage calculation overflows or cannot be safely represented
/// (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    fraction(*percent)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate the discount amount on a price for a percentage.
///
/// # Errors
///
/// Returns an error if the amount cannot be represented in minor units.
pub fn discount_on<'a>(
    price: &Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount_minor = percent_of_minor(percent, price.to_minor_units())?;

    Ok(Money::from_minor(discount_minor, price.currency()))
}
