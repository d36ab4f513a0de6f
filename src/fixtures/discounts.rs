//! Discount Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    discounts::{Discount, DiscountCatalog},
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
};

/// Discount fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Percentage off (e.g., "20%")
    Percentage {
        /// Discount name
        name: String,

        /// Percentage, as "20%" or "0.2"
        value: String,
    },

    /// Fixed amount off (e.g., "10.00 USD")
    Fixed {
        /// Discount name
        name: String,

        /// Amount, as "AMOUNT CURRENCY"
        value: String,
    },
}

impl TryFrom<DiscountFixture> for Discount<'static> {
    type Error = FixtureError;

    fn try_from(fixture: DiscountFixture) -> Result<Self, Self::Error> {
        match fixture {
            DiscountFixture::Percentage { name, value } => {
                Ok(Discount::percentage_off(name, parse_percentage(&value)?))
            }
            DiscountFixture::Fixed { name, value } => {
                let (minor_units, currency) = parse_price(&value)?;

                Ok(Discount::amount_off(name, Money::from_minor(minor_units, currency)))
            }
        }
    }
}

/// Stackable and non-stackable discounts from YAML
#[derive(Debug, Default, Deserialize)]
pub struct DiscountsFixture {
    /// Discounts that combine
    #[serde(default)]
    pub stackable: Vec<DiscountFixture>,

    /// Mutually exclusive discounts
    #[serde(default)]
    pub non_stackable: Vec<DiscountFixture>,
}

impl TryFrom<DiscountsFixture> for DiscountCatalog<'static> {
    type Error = FixtureError;

    fn try_from(fixture: DiscountsFixture) -> Result<Self, Self::Error> {
        let convert = |discounts: Vec<DiscountFixture>| {
            discounts
                .into_iter()
                .map(Discount::try_from)
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(DiscountCatalog::new(
            convert(fixture.stackable)?,
            convert(fixture.non_stackable)?,
        ))
    }
}
