//! Fixtures
//!
//! YAML catalog files: category ids, discounts and per-category products.
//!
//! ```yaml
//! currency: USD
//! categories:
//!   edible: 6e73028e-8a2b-4f3c-9e1a-2d8c3b4a5f6g
//! discounts:
//!   stackable:
//!     - { type: percentage, name: Weekend Special, value: "20%" }
//!   non_stackable:
//!     - { type: fixed, name: $10 Off, value: 10.00 USD }
//! products:
//!   edible:
//!     - { id: "1", name: CBD Gummies, price: 40.00 USD, thc: 0, cbd: 100 }
//! ```

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::Catalog,
    discounts::{DiscountCatalog, DiscountValue},
    fixtures::{discounts::DiscountsFixture, products::ProductFixture},
    products::Product,
};

pub mod discounts;
pub mod products;

/// Catalog bundled with the crate
pub const DEFAULT_CATALOG: &str = include_str!("../../fixtures/catalog.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Potency is negative or not a finite number
    #[error("Invalid potency for product: {0}")]
    InvalidPotency(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Products listed under a category that has no id
    #[error("Products listed for unknown category: {0}")]
    UnknownCategory(String),

    /// Currency mismatch between the catalog and a price
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Catalog file from YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Catalog currency code (e.g., "USD")
    pub currency: String,

    /// Map of category name -> category id
    pub categories: FxHashMap<String, String>,

    /// Default discounts
    #[serde(default)]
    pub discounts: DiscountsFixture,

    /// Map of category name -> discounts replacing the defaults
    #[serde(default)]
    pub category_discounts: FxHashMap<String, DiscountsFixture>,

    /// Map of category name -> products, in display order
    #[serde(default)]
    pub products: FxHashMap<String, Vec<ProductFixture>>,
}

impl TryFrom<CatalogFixture> for Catalog<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let currency = products::parse_currency(&fixture.currency)?;

        let discounts = DiscountCatalog::try_from(fixture.discounts)?;
        ensure_discount_currency(&discounts, currency)?;

        let mut catalog = Catalog::new(currency).with_discounts(discounts);

        for (name, id) in &fixture.categories {
            catalog = catalog.with_category(name, id.clone());
        }

        for (name, discounts) in fixture.category_discounts {
            let discounts = DiscountCatalog::try_from(discounts)?;
            ensure_discount_currency(&discounts, currency)?;

            catalog = catalog.with_category_discounts(&name, discounts);
        }

        for (name, product_fixtures) in fixture.products {
            let id = fixture
                .categories
                .iter()
                .find(|(category, _)| category.eq_ignore_ascii_case(&name))
                .map(|(_, id)| id.clone())
                .ok_or_else(|| FixtureError::UnknownCategory(name.clone()))?;

            let products = product_fixtures
                .into_iter()
                .map(Product::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            for product in &products {
                ensure_currency(product.price, currency)?;
            }

            catalog = catalog.with_products(id, products);
        }

        Ok(catalog)
    }
}

fn ensure_discount_currency(
    discounts: &DiscountCatalog<'_>,
    currency: &Currency,
) -> Result<(), FixtureError> {
    discounts
        .stackable
        .iter()
        .chain(&discounts.non_stackable)
        .try_for_each(|discount| match discount.value {
            DiscountValue::AmountOff(amount) => ensure_currency(amount, currency),
            DiscountValue::PercentageOff(_) => Ok(()),
        })
}

fn ensure_currency(money: Money<'_, Currency>, currency: &Currency) -> Result<(), FixtureError> {
    if money.currency() == currency {
        Ok(())
    } else {
        Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            money.currency().iso_alpha_code.to_string(),
        ))
    }
}

/// Parse a catalog from YAML
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price or percentage can't be
/// parsed, or the amounts use more than one currency.
pub fn catalog_from_str(contents: &str) -> Result<Catalog<'static>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(contents)?;

    Catalog::try_from(fixture)
}

/// Load a catalog from a YAML fixture file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed (see [`catalog_from_str`]).
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog<'static>, FixtureError> {
    let contents = fs::read_to_string(path)?;

    catalog_from_str(&contents)
}

/// The catalog bundled with the crate
///
/// # Errors
///
/// Returns an error if the bundled catalog cannot be parsed.
pub fn default_catalog() -> Result<Catalog<'static>, FixtureError> {
    catalog_from_str(DEFAULT_CATALOG)
}
