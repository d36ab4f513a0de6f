//! Pipeline
//!
//! A fixed sequence for one request: resolve the category, fetch its discounts,
//! query the inventory, then compute the bundles. All state lives in the request
//! and the returned [`Recommendation`].

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{Span, info, warn};

use crate::{
    bundles::{Bundle, BundleError, compute_bundles},
    catalog::{CatalogError, CategoryResolver, DiscountSource, InventorySource, ResolvedCategory},
    discounts::DiscountCatalog,
    products::Product,
};

/// Errors raised while producing a recommendation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Wrapped inventory query error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped bundle calculation error.
    #[error(transparent)]
    Bundle(#[from] BundleError),
}

/// What the shopper asked for.
#[derive(Debug, Clone)]
pub struct BundleRequest<'a> {
    /// Category name (e.g., "edible")
    pub category: String,

    /// Most the shopper wants to spend
    pub budget: Money<'a, Currency>,
}

impl<'a> BundleRequest<'a> {
    /// Create a new request
    pub fn new(category: impl Into<String>, budget: Money<'a, Currency>) -> Self {
        Self {
            category: category.into(),
            budget,
        }
    }
}

/// Everything derived for one request.
#[derive(Debug, Clone)]
pub struct Recommendation<'a> {
    /// The resolved category
    pub category: ResolvedCategory,

    /// Discounts that were active for the category
    pub discounts: DiscountCatalog<'a>,

    /// Products returned by the inventory query
    pub candidates: Vec<Product<'a>>,

    /// Maximum savings, most items and premium selection bundles
    pub bundles: [Bundle<'a>; 3],
}

/// Run the pipeline for a request.
///
/// # Errors
///
/// Returns a [`PipelineError`] if the inventory can't be queried or the bundles
/// can't be computed.
#[tracing::instrument(
    skip_all,
    fields(
        category = %request.category,
        budget = %request.budget,
        category_id = tracing::field::Empty,
        candidates = tracing::field::Empty
    )
)]
pub fn recommend<'a, S>(
    source: &S,
    request: &BundleRequest<'a>,
) -> Result<Recommendation<'a>, PipelineError>
where
    S: CategoryResolver + DiscountSource<'a> + InventorySource<'a>,
{
    let span = Span::current();

    let category = source.resolve_category(&request.category);
    span.record("category_id", tracing::field::display(&category.id));

    if !category.is_known() {
        warn!(category = %category.name, "unknown category");
    }

    let discounts = source.discounts(Some(category.name.as_str()));
    let candidates = source.query_inventory(&category.id, request.budget)?;
    span.record("candidates", candidates.len());

    let bundles = compute_bundles(&candidates, &discounts, request.budget)?;

    for bundle in &bundles {
        info!(
            bundle = %bundle.kind(),
            items = bundle.len(),
            total = %bundle.total(),
            "recommended bundle"
        );
    }

    Ok(Recommendation {
        category,
        discounts,
        candidates,
        bundles,
    })
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        bundles::BundleKind,
        catalog::{Catalog, UNKNOWN_CATEGORY_ID},
        discounts::Discount,
        pricing::InvalidInputError,
    };

    use super::*;

    fn catalog<'a>() -> Catalog<'a> {
        Catalog::new(USD)
            .with_category("flower", "flower-id")
            .with_discounts(DiscountCatalog::new(
                vec![Discount::percentage_off(
                    "Weekend Special",
                    Percentage::from(Decimal::new(20, 2)),
                )],
                vec![Discount::percentage_off(
                    "Flash Sale",
                    Percentage::from(Decimal::new(25, 2)),
                )],
            ))
            .with_products(
                "flower-id",
                [
                    Product::new("f1", "Eighth", Money::from_minor(3500, USD)),
                    Product::new("f2", "Pre-roll", Money::from_minor(1000, USD)),
                    Product::new("f3", "Ounce", Money::from_minor(20_000, USD)),
                ],
            )
    }

    #[test]
    fn recommend_runs_every_step() -> TestResult {
        let request = BundleRequest::new("Flower", Money::from_minor(5000, USD));

        let recommendation = recommend(&catalog(), &request)?;

        assert_eq!(recommendation.category.id, "flower-id");
        assert_eq!(recommendation.candidates.len(), 2);
        assert_eq!(
            recommendation.bundles.each_ref().map(Bundle::kind),
            BundleKind::ALL
        );

        let [savings, most, premium] = &recommendation.bundles;

        // 28.00 + 8.00
        assert_eq!(savings.total(), Money::from_minor(3600, USD));
        assert_eq!(most.len(), 2);
        // 26.25 + 7.50
        assert_eq!(premium.total(), Money::from_minor(3375, USD));

        Ok(())
    }

    #[test]
    fn unknown_category_gives_empty_bundles() -> TestResult {
        let request = BundleRequest::new("tincture", Money::from_minor(5000, USD));

        let recommendation = recommend(&catalog(), &request)?;

        assert_eq!(recommendation.category.id, UNKNOWN_CATEGORY_ID);
        assert!(recommendation.candidates.is_empty());
        assert!(recommendation.bundles.iter().all(Bundle::is_empty));

        Ok(())
    }

    #[test]
    fn missing_non_stackable_discount_fails_the_request() {
        let catalog = catalog().with_discounts(DiscountCatalog::default());
        let request = BundleRequest::new("flower", Money::from_minor(5000, USD));

        let result = recommend(&catalog, &request);

        assert!(matches!(
            result,
            Err(PipelineError::Bundle(BundleError::InvalidInput(
                InvalidInputError::NoNonStackableDiscount
            )))
        ));
    }
}
