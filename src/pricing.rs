//! Discount Model
//!
//! Derives a single combined rate from the stackable discounts and picks the
//! best non-stackable discount, then prices products under either mode.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::discounts::{
    Discount, DiscountCatalog, DiscountError, DiscountValue, discount_on, fraction,
};

/// Inputs that make a discount model impossible to build.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidInputError {
    /// There is no non-stackable discount to select.
    #[error("no non-stackable discount available to select")]
    NoNonStackableDiscount,

    /// A fixed discount cannot be compared to percentages when the budget is zero.
    #[error("cannot score fixed discount '{0}' against a zero budget")]
    ZeroBudgetFixedScore(String),

    /// Percentage discounts must be greater than 0% and at most 100%.
    #[error("discount '{name}' is {points}%, expected a value in (0, 100]")]
    PercentageOutOfRange {
        /// Discount name
        name: String,
        /// Offending value in percent points
        points: Decimal,
    },

    /// Fixed discounts cannot be negative.
    #[error("discount '{name}' has a negative amount of {minor_units} minor units")]
    NegativeAmount {
        /// Discount name
        name: String,
        /// Offending amount in minor units
        minor_units: i64,
    },

    /// A fixed discount is in a different currency from the budget.
    #[error("discount '{name}' is in {actual}, but the budget is in {expected}")]
    CurrencyMismatch {
        /// Discount name
        name: String,
        /// Budget currency code
        expected: &'static str,
        /// Discount currency code
        actual: &'static str,
    },
}

/// Which discount set prices a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackingMode {
    /// Apply the combined rate of all stackable percentage discounts.
    Stackable,

    /// Apply the single best non-stackable discount.
    NonStackable,
}

/// Pricing rules derived from one discount catalog and budget.
#[derive(Debug, Clone)]
pub struct DiscountModel<'a> {
    stackable_rate: Percentage,
    stackable_names: SmallVec<[String; 4]>,
    best_non_stackable: Discount<'a>,
}

impl<'a> DiscountModel<'a> {
    /// Build the model for a catalog and budget.
    ///
    /// Only `PercentageOff` entries contribute to the stackable rate; fixed
    /// amounts in the stackable set are ignored and never validated.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidInputError`] if any discount is out of range, the
    /// non-stackable set is empty, or a fixed non-stackable discount has to be
    /// scored against a zero budget.
    pub fn new(
        discounts: &DiscountCatalog<'a>,
        budget: Money<'a, Currency>,
    ) -> Result<Self, InvalidInputError> {
        // Fixed amounts in the stackable set never price anything
        discounts
            .stackable
            .iter()
            .filter(|discount| matches!(discount.value, DiscountValue::PercentageOff(_)))
            .chain(&discounts.non_stackable)
            .try_for_each(|discount| validate(discount, budget.currency()))?;

        let (rate, stackable_names) = discounts.stackable.iter().fold(
            (Decimal::ZERO, SmallVec::new()),
            |(rate, mut names), discount| match discount.value {
                DiscountValue::PercentageOff(percent) => {
                    names.push(discount.name.clone());
                    (rate + fraction(percent), names)
                }
                DiscountValue::AmountOff(_) => (rate, names),
            },
        );

        let best_non_stackable = best_non_stackable(&discounts.non_stackable, budget)?.clone();

        debug!(
            stackable_rate = %rate,
            best_non_stackable = %best_non_stackable.name,
            "built discount model"
        );

        Ok(Self {
            stackable_rate: Percentage::from(rate),
            stackable_names,
            best_non_stackable,
        })
    }

    /// Combined rate of the stackable percentage discounts (e.g. `0.30` for 20% + 10%).
    pub fn stackable_rate(&self) -> Percentage {
        self.stackable_rate
    }

    /// The non-stackable discount selected for this budget.
    pub fn best_non_stackable(&self) -> &Discount<'a> {
        &self.best_non_stackable
    }

    /// Names of the discounts a price adjustment under `mode` applies.
    pub fn applied_discounts(&self, mode: StackingMode) -> SmallVec<[String; 4]> {
        match mode {
            StackingMode::Stackable => self.stackable_names.clone(),
            StackingMode::NonStackable => {
                SmallVec::from_elem(self.best_non_stackable.name.clone(), 1)
            }
        }
    }

    /// Price a product under the given stacking mode. The result is never negative.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage cannot be represented in minor
    /// units or the price and a fixed discount are in different currencies.
    pub fn adjust(
        &self,
        price: Money<'a, Currency>,
        mode: StackingMode,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match (mode, self.best_non_stackable.value) {
            (StackingMode::Stackable, _) => reduce_by(price, &self.stackable_rate),
            (StackingMode::NonStackable, DiscountValue::PercentageOff(percent)) => {
                reduce_by(price, &percent)
            }
            (StackingMode::NonStackable, DiscountValue::AmountOff(amount)) => {
                Ok(floor_at_zero(price.sub(amount)?))
            }
        }
    }
}

fn validate(discount: &Discount<'_>, budget_currency: &Currency) -> Result<(), InvalidInputError> {
    match discount.value {
        DiscountValue::PercentageOff(percent) => {
            let value = fraction(percent);

            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(InvalidInputError::PercentageOutOfRange {
                    name: discount.name.clone(),
                    points: value * Decimal::ONE_HUNDRED,
                });
            }
        }
        DiscountValue::AmountOff(amount) => {
            if amount.is_negative() {
                return Err(InvalidInputError::NegativeAmount {
                    name: discount.name.clone(),
                    minor_units: amount.to_minor_units(),
                });
            }

            if amount.currency() != budget_currency {
                return Err(InvalidInputError::CurrencyMismatch {
                    name: discount.name.clone(),
                    expected: budget_currency.iso_alpha_code,
                    actual: amount.currency().iso_alpha_code,
                });
            }
        }
    }

    Ok(())
}

/// Pick the discount with the highest score; the first one wins a tie.
fn best_non_stackable<'d, 'a>(
    discounts: &'d [Discount<'a>],
    budget: Money<'a, Currency>,
) -> Result<&'d Discount<'a>, InvalidInputError> {
    let scored = discounts
        .iter()
        .map(|discount| Ok((comparability_score(discount, budget)?, discount)))
        .collect::<Result<SmallVec<[(Decimal, &Discount<'a>); 4]>, InvalidInputError>>()?;

    scored
        .into_iter()
        .fold(None, |best: Option<(Decimal, &'d Discount<'a>)>, (score, discount)| {
            match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, discount)),
            }
        })
        .map(|(_, discount)| discount)
        .ok_or(InvalidInputError::NoNonStackableDiscount)
}

/// Express a discount in percent points of the budget so fixed and percentage
/// discounts can be compared.
fn comparability_score(
    discount: &Discount<'_>,
    budget: Money<'_, Currency>,
) -> Result<Decimal, InvalidInputError> {
    let DiscountValue::AmountOff(amount) = discount.value else {
        return Ok(discount.percent_points().unwrap_or(Decimal::ZERO));
    };

    if budget.is_zero() {
        return Err(InvalidInputError::ZeroBudgetFixedScore(
            discount.name.clone(),
        ));
    }

    let amount = Decimal::from(amount.to_minor_units());
    let budget = Decimal::from(budget.to_minor_units());

    Ok(amount / budget * Decimal::ONE_HUNDRED)
}

fn reduce_by<'a>(
    price: Money<'a, Currency>,
    percent: &Percentage,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount = discount_on(&price, percent)?;

    Ok(floor_at_zero(price.sub(discount)?))
}

fn floor_at_zero(money: Money<'_, Currency>) -> Money<'_, Currency> {
    if money.is_negative() {
        Money::from_minor(0, money.currency())
    } else {
        money
    }
}
