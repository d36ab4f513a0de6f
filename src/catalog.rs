//! Catalog
//!
//! Category lookup, discount retrieval and inventory querying. The traits are the
//! seams a real data source plugs into; [`Catalog`] is an in-memory implementation
//! of all three, usually loaded from a fixture.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{discounts::DiscountCatalog, products::Product};

/// Category identifier returned for names the catalog doesn't know.
pub const UNKNOWN_CATEGORY_ID: &str = "unknown";

/// Errors raised while querying the catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// The budget is in a different currency from the catalog.
    #[error("budget is in {budget}, but the catalog is in {catalog}")]
    CurrencyMismatch {
        /// Budget currency code
        budget: &'static str,
        /// Catalog currency code
        catalog: &'static str,
    },

    /// The price ceiling could not be represented.
    #[error("price ceiling overflowed for a budget of {0} minor units")]
    CeilingOverflow(i64),
}

/// A category name resolved to its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    /// Category identifier, or [`UNKNOWN_CATEGORY_ID`]
    pub id: String,

    /// Category name, as requested
    pub name: String,
}

impl ResolvedCategory {
    /// Whether the name resolved to a known category
    pub fn is_known(&self) -> bool {
        self.id != UNKNOWN_CATEGORY_ID
    }
}

/// Resolves category names to identifiers.
pub trait CategoryResolver {
    /// Resolve a category name. Unknown names resolve to [`UNKNOWN_CATEGORY_ID`].
    fn resolve_category(&self, name: &str) -> ResolvedCategory;
}

/// Supplies the active discounts.
pub trait DiscountSource<'a> {
    /// Discounts for a category, or the default discounts when `category` is `None`
    /// or has no discounts of its own.
    fn discounts(&self, category: Option<&str>) -> DiscountCatalog<'a>;
}

/// Supplies candidate products.
pub trait InventorySource<'a> {
    /// Products in a category priced at or below the budget ceiling.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the budget can't be compared to the inventory.
    fn query_inventory(
        &self,
        category_id: &str,
        budget: Money<'a, Currency>,
    ) -> Result<Vec<Product<'a>>, CatalogError>;
}

/// In-memory catalog
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    currency: &'a Currency,

    /// Lowercase category name -> category id
    categories: FxHashMap<String, String>,

    discounts: DiscountCatalog<'a>,

    /// Lowercase category name -> discounts for that category only
    category_discounts: FxHashMap<String, DiscountCatalog<'a>>,

    /// Category id -> products, in catalog order
    inventory: FxHashMap<String, Vec<Product<'a>>>,

    /// Multiplier on the budget giving the inventory price ceiling
    headroom: Decimal,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog with a price ceiling of 1.5 times the budget.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            currency,
            categories: FxHashMap::default(),
            discounts: DiscountCatalog::default(),
            category_discounts: FxHashMap::default(),
            inventory: FxHashMap::default(),
            headroom: Decimal::new(15, 1),
        }
    }

    /// Register a category name and its identifier
    #[must_use]
    pub fn with_category(mut self, name: &str, id: impl Into<String>) -> Self {
        self.categories.insert(name.to_lowercase(), id.into());
        self
    }

    /// Set the default discounts
    #[must_use]
    pub fn with_discounts(mut self, discounts: DiscountCatalog<'a>) -> Self {
        self.discounts = discounts;
        self
    }

    /// Set discounts that replace the defaults for one category
    #[must_use]
    pub fn with_category_discounts(mut self, name: &str, discounts: DiscountCatalog<'a>) -> Self {
        self.category_discounts.insert(name.to_lowercase(), discounts);
        self
    }

    /// Add products to a category
    #[must_use]
    pub fn with_products(
        mut self,
        category_id: impl Into<String>,
        products: impl IntoIterator<Item = Product<'a>>,
    ) -> Self {
        self.inventory
            .entry(category_id.into())
            .or_default()
            .extend(products);
        self
    }

    /// Set the budget multiplier used as the inventory price ceiling
    #[must_use]
    pub fn with_headroom(mut self, headroom: Decimal) -> Self {
        self.headroom = headroom;
        self
    }

    /// Catalog currency
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}

impl CategoryResolver for Catalog<'_> {
    fn resolve_category(&self, name: &str) -> ResolvedCategory {
        let id = self
            .categories
            .get(&name.to_lowercase())
            .map_or_else(|| UNKNOWN_CATEGORY_ID.to_string(), Clone::clone);

        ResolvedCategory {
            id,
            name: name.to_string(),
        }
    }
}

impl<'a> DiscountSource<'a> for Catalog<'a> {
    fn discounts(&self, category: Option<&str>) -> DiscountCatalog<'a> {
        category
            .and_then(|name| self.category_discounts.get(&name.to_lowercase()))
            .unwrap_or(&self.discounts)
            .clone()
    }
}

impl<'a> InventorySource<'a> for Catalog<'a> {
    fn query_inventory(
        &self,
        category_id: &str,
        budget: Money<'a, Currency>,
    ) -> Result<Vec<Product<'a>>, CatalogError> {
        if budget.currency() != self.currency {
            return Err(CatalogError::CurrencyMismatch {
                budget: budget.currency().iso_alpha_code,
                catalog: self.currency.iso_alpha_code,
            });
        }

        let ceiling = Decimal::from(budget.to_minor_units())
            .checked_mul(self.headroom)
            .ok_or(CatalogError::CeilingOverflow(budget.to_minor_units()))?;

        let products: Vec<Product<'a>> = self
            .inventory
            .get(category_id)
            .map(|products| {
                products
                    .iter()
                    .filter(|product| Decimal::from(product.price.to_minor_units()) <= ceiling)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            category_id,
            ceiling_minor = %ceiling,
            found = products.len(),
            "queried inventory"
        );

        Ok(products)
    }
}
