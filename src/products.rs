//! Products

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Compound concentrations, carried through for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Potency {
    /// THC content in milligrams
    pub thc: Decimal,

    /// CBD content in milligrams
    pub cbd: Decimal,
}

impl Potency {
    /// Create a new potency from THC and CBD amounts
    pub fn new(thc: Decimal, cbd: Decimal) -> Self {
        Self { thc, cbd }
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product identifier, unique within an inventory query
    pub id: String,

    /// Product name
    pub name: String,

    /// Product base price
    pub price: Money<'a, Currency>,

    /// Product potency
    pub potency: Potency,
}

impl<'a> Product<'a> {
    /// Create a new product with no potency information
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            potency: Potency::default(),
        }
    }

    /// Set the potency of the product
    #[must_use]
    pub fn with_potency(mut self, potency: Potency) -> Self {
        self.potency = potency;
        self
    }
}
