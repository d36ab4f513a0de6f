//! Bundles
//!
//! Three greedy selections over the same product list. Each strategy orders
//! its candidates, then walks them once, keeping every product whose
//! discounted price still fits in the remaining budget. Products that don't
//! fit are skipped rather than ending the walk, so a cheaper product later in
//! the order can still be picked up.
//!
//! None of the strategies promise an optimal subset; they are heuristics.

use std::{cmp::Reverse, fmt};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    discounts::{DiscountCatalog, DiscountError},
    pricing::{DiscountModel, InvalidInputError, StackingMode},
    products::Product,
};

/// Number of highest priced products the premium selection considers.
pub const PREMIUM_CANDIDATES: usize = 3;

/// Errors that stop bundles from being computed.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The discounts or budget can't produce a discount model.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The strategy that produced a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleKind {
    /// Products with the largest stackable savings first.
    MaximumSavings,

    /// Cheapest discounted products first.
    MostItems,

    /// The most expensive products, priced with the best non-stackable discount.
    PremiumSelection,
}

impl BundleKind {
    /// All bundle kinds, in presentation order.
    pub const ALL: [BundleKind; 3] = [
        BundleKind::MaximumSavings,
        BundleKind::MostItems,
        BundleKind::PremiumSelection,
    ];

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            BundleKind::MaximumSavings => "Maximum Savings",
            BundleKind::MostItems => "Most Items",
            BundleKind::PremiumSelection => "Premium Selection",
        }
    }

    /// Marker shown next to the label
    pub fn marker(self) -> &'static str {
        match self {
            BundleKind::MaximumSavings => "💰",
            BundleKind::MostItems => "📦",
            BundleKind::PremiumSelection => "💎",
        }
    }

    /// Discount set used to price the products in this bundle
    pub fn stacking_mode(self) -> StackingMode {
        match self {
            BundleKind::MaximumSavings | BundleKind::MostItems => StackingMode::Stackable,
            BundleKind::PremiumSelection => StackingMode::NonStackable,
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A product selected into a bundle, with its discounted price.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleItem<'a> {
    /// The selected product
    pub product: Product<'a>,

    /// Price after the bundle's discounts
    pub discounted_price: Money<'a, Currency>,
}

impl<'a> BundleItem<'a> {
    /// Amount saved on this item
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.product.price.sub(self.discounted_price)
    }
}

/// A labelled selection of products that fits within a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle<'a> {
    kind: BundleKind,
    items: Vec<BundleItem<'a>>,
    total: Money<'a, Currency>,
    currency: &'a Currency,
    discounts: SmallVec<[String; 4]>,
}

impl<'a> Bundle<'a> {
    /// Create an empty bundle
    pub fn new(kind: BundleKind, currency: &'a Currency) -> Self {
        Self {
            kind,
            items: Vec::new(),
            total: Money::from_minor(0, currency),
            currency,
            discounts: SmallVec::new(),
        }
    }

    /// Set the names of the discounts applied to the items
    #[must_use]
    pub fn with_discounts(mut self, discounts: SmallVec<[String; 4]>) -> Self {
        self.discounts = discounts;
        self
    }

    /// The strategy that produced this bundle
    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Selected items, in selection order
    pub fn items(&self) -> &[BundleItem<'a>] {
        &self.items
    }

    /// Sum of the discounted prices of the items
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency of all amounts in the bundle
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Names of the discounts applied to the items
    pub fn discounts(&self) -> &[String] {
        &self.discounts
    }

    /// Get the number of items in the bundle.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the base prices of the items
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if there was a currency mismatch.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.items
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, item| {
                acc.add(item.product.price)
            })
    }

    /// Amount saved against the base prices
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if there was a currency mismatch.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal()?.sub(self.total)
    }

    /// Savings as a fraction of the subtotal, zero for an empty bundle
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if there was a currency mismatch.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let subtotal_minor = self.subtotal()?.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(Decimal::ZERO));
        }

        let savings_minor = self.savings()?.to_minor_units();

        Ok(Percentage::from(
            Decimal::from(savings_minor) / Decimal::from(subtotal_minor),
        ))
    }

    /// Add the item if it fits within `budget`, returning whether it was added.
    fn try_push(
        &mut self,
        product: &Product<'a>,
        discounted_price: Money<'a, Currency>,
        budget: Money<'a, Currency>,
    ) -> Result<bool, MoneyError> {
        let next_total = self.total.add(discounted_price)?;

        if next_total.to_minor_units() > budget.to_minor_units() {
            return Ok(false);
        }

        self.items.push(BundleItem {
            product: product.clone(),
            discounted_price,
        });
        self.total = next_total;

        Ok(true)
    }
}

/// A product paired with its price under one stacking mode.
struct Candidate<'p, 'a> {
    product: &'p Product<'a>,
    discounted_price: Money<'a, Currency>,
}

impl Candidate<'_, '_> {
    fn savings_minor(&self) -> i64 {
        self.product.price.to_minor_units() - self.discounted_price.to_minor_units()
    }
}

fn price_candidates<'p, 'a>(
    products: impl IntoIterator<Item = &'p Product<'a>>,
    model: &DiscountModel<'a>,
    mode: StackingMode,
) -> Result<Vec<Candidate<'p, 'a>>, DiscountError>
where
    'a: 'p,
{
    products
        .into_iter()
        .map(|product| {
            Ok(Candidate {
                product,
                discounted_price: model.adjust(product.price, mode)?,
            })
        })
        .collect()
}

/// Walk the ordered candidates once, keeping each one that still fits.
fn greedy_walk<'a>(
    kind: BundleKind,
    candidates: Vec<Candidate<'_, 'a>>,
    model: &DiscountModel<'a>,
    budget: Money<'a, Currency>,
) -> Result<Bundle<'a>, BundleError> {
    let mut bundle = Bundle::new(kind, budget.currency())
        .with_discounts(model.applied_discounts(kind.stacking_mode()));

    if !budget.is_positive() {
        return Ok(bundle);
    }

    for candidate in candidates {
        let added = bundle.try_push(candidate.product, candidate.discounted_price, budget)?;

        if !added {
            debug!(
                bundle = %kind,
                product = %candidate.product.id,
                price = %candidate.discounted_price,
                "skipped product over budget"
            );
        }
    }

    Ok(bundle)
}

/// Products with the largest stackable savings first.
///
/// # Errors
///
/// Returns a [`BundleError`] if a price can't be adjusted or the currencies differ.
pub fn maximum_savings<'a>(
    products: &[Product<'a>],
    model: &DiscountModel<'a>,
    budget: Money<'a, Currency>,
) -> Result<Bundle<'a>, BundleError> {
    let mut candidates = price_candidates(products, model, StackingMode::Stackable)?;

    candidates.sort_by_key(|candidate| Reverse(candidate.savings_minor()));

    greedy_walk(BundleKind::MaximumSavings, candidates, model, budget)
}

/// Cheapest stackable prices first, to fit as many products as possible.
///
/// # Errors
///
/// Returns a [`BundleError`] if a price can't be adjusted or the currencies differ.
pub fn most_items<'a>(
    products: &[Product<'a>],
    model: &DiscountModel<'a>,
    budget: Money<'a, Currency>,
) -> Result<Bundle<'a>, BundleError> {
    let mut candidates = price_candidates(products, model, StackingMode::Stackable)?;

    candidates.sort_by_key(|candidate| candidate.discounted_price.to_minor_units());

    greedy_walk(BundleKind::MostItems, candidates, model, budget)
}

/// The [`PREMIUM_CANDIDATES`] highest base prices, priced with the best non-stackable discount.
///
/// # Errors
///
/// Returns a [`BundleError`] if a price can't be adjusted or the currencies differ.
pub fn premium_selection<'a>(
    products: &[Product<'a>],
    model: &DiscountModel<'a>,
    budget: Money<'a, Currency>,
) -> Result<Bundle<'a>, BundleError> {
    let mut by_price: Vec<&Product<'a>> = products.iter().collect();

    by_price.sort_by_key(|product| Reverse(product.price.to_minor_units()));

    let candidates = price_candidates(
        by_price.into_iter().take(PREMIUM_CANDIDATES),
        model,
        StackingMode::NonStackable,
    )?;

    greedy_walk(BundleKind::PremiumSelection, candidates, model, budget)
}

/// Compute the maximum savings, most items and premium selection bundles, in that order.
///
/// # Errors
///
/// Returns a [`BundleError`] if the discount model can't be built (for example, there
/// is no non-stackable discount), or a price can't be adjusted. No bundles are
/// returned when any strategy fails.
#[tracing::instrument(skip_all, fields(products = products.len(), budget = %budget))]
pub fn compute_bundles<'a>(
    products: &[Product<'a>],
    discounts: &DiscountCatalog<'a>,
    budget: Money<'a, Currency>,
) -> Result<[Bundle<'a>; 3], BundleError> {
    let model = DiscountModel::new(discounts, budget)?;

    let bundles = [
        maximum_savings(products, &model, budget)?,
        most_items(products, &model, budget)?,
        premium_selection(products, &model, budget)?,
    ];

    for bundle in &bundles {
        debug!(
            bundle = %bundle.kind(),
            items = bundle.len(),
            total = %bundle.total(),
            "computed bundle"
        );
    }

    Ok(bundles)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::discounts::Discount;

    use super::*;

    fn percent(points: i64) -> Percentage {
        Percentage::from(Decimal::new(points, 2))
    }

    fn product<'a>(id: &str, minor: i64) -> Product<'a> {
        Product::new(id, format!("Product {id}"), Money::from_minor(minor, USD))
    }

    fn edibles<'a>() -> Vec<Product<'a>> {
        vec![
            product("1", 4000),
            product("2", 3000),
            product("3", 1800),
            product("4", 1500),
            product("5", 1800),
        ]
    }

    fn discounts<'a>() -> DiscountCatalog<'a> {
        DiscountCatalog::new(
            vec![
                Discount::percentage_off("Weekend Special", percent(20)),
                Discount::percentage_off("Member Discount", percent(10)),
            ],
            vec![
                Discount::amount_off("$10 Off", Money::from_minor(1000, USD)),
                Discount::percentage_off("Flash Sale", percent(25)),
            ],
        )
    }

    fn ids(bundle: &Bundle<'_>) -> Vec<String> {
        bundle
            .items()
            .iter()
            .map(|item| item.product.id.clone())
            .collect()
    }

    fn budget<'a>(minor: i64) -> Money<'a, Currency> {
        Money::from_minor(minor, USD)
    }

    #[test]
    fn maximum_savings_orders_by_savings_descending() -> TestResult {
        let model = DiscountModel::new(&discounts(), budget(10_000))?;
        let bundle = maximum_savings(&edibles(), &model, budget(10_000))?;

        assert_eq!(ids(&bundle), ["1", "2", "3", "5", "4"]);
        assert_eq!(bundle.total(), Money::from_minor(8470, USD));
        assert_eq!(
            bundle.discounts(),
            ["Weekend Special".to_string(), "Member Discount".to_string()]
        );

        Ok(())
    }

    #[test]
    fn maximum_savings_skips_products_that_do_not_fit() -> TestResult {
        let products = [product("a", 4000), product("b", 3000), product("c", 1500)];
        let model = DiscountModel::new(&discounts(), budget(4000))?;

        let bundle = maximum_savings(&products, &model, budget(4000))?;

        // 28.00 fits, 21.00 would make 49.00, 10.50 still fits afterwards
        assert_eq!(ids(&bundle), ["a", "c"]);
        assert_eq!(bundle.total(), Money::from_minor(3850, USD));

        Ok(())
    }

    #[test]
    fn most_items_orders_by_discounted_price_ascending() -> TestResult {
        let model = DiscountModel::new(&discounts(), budget(5000))?;
        let bundle = most_items(&edibles(), &model, budget(5000))?;

        // 10.50 + 12.60 + 12.60 = 35.70; 21.00 and 28.00 no longer fit
        assert_eq!(ids(&bundle), ["4", "3", "5"]);
        assert_eq!(bundle.total(), Money::from_minor(3570, USD));

        Ok(())
    }

    #[test]
    fn premium_selection_only_considers_top_three() -> TestResult {
        let model = DiscountModel::new(&discounts(), budget(10_000))?;
        let bundle = premium_selection(&edibles(), &model, budget(10_000))?;

        // "3" precedes "5" at the same base price
        assert_eq!(ids(&bundle), ["1", "2", "3"]);
        assert_eq!(bundle.total(), Money::from_minor(6600, USD));
        assert_eq!(bundle.discounts(), ["Flash Sale".to_string()]);

        Ok(())
    }

    #[test]
    fn premium_selection_skips_within_top_three() -> TestResult {
        let model = DiscountModel::new(&discounts(), budget(5000))?;
        let bundle = premium_selection(&edibles(), &model, budget(5000))?;

        // 30.00 + 22.50 = 52.50 is over budget, so "2" is skipped and "3" fits
        assert_eq!(ids(&bundle), ["1", "3"]);
        assert_eq!(bundle.total(), Money::from_minor(4350, USD));

        Ok(())
    }

    #[test]
    fn empty_products_give_empty_bundles() -> TestResult {
        let bundles = compute_bundles(&[], &discounts(), budget(10_000))?;

        for (bundle, kind) in bundles.iter().zip(BundleKind::ALL) {
            assert_eq!(bundle.kind(), kind);
            assert!(bundle.is_empty());
            assert_eq!(bundle.total(), Money::from_minor(0, USD));
        }

        Ok(())
    }

    #[test]
    fn non_positive_budget_gives_empty_bundles() -> TestResult {
        let discounts = DiscountCatalog::new(
            vec![Discount::percentage_off("Everything", percent(100))],
            vec![Discount::percentage_off("Flash Sale", percent(25))],
        );

        for minor in [0, -500] {
            let bundles = compute_bundles(&edibles(), &discounts, budget(minor))?;

            assert!(
                bundles.iter().all(Bundle::is_empty),
                "bundles not empty for budget {minor}"
            );
        }

        Ok(())
    }

    #[test]
    fn missing_non_stackable_discount_is_fatal() {
        let discounts = DiscountCatalog::new(discounts().stackable, vec![]);

        let result = compute_bundles(&edibles(), &discounts, budget(10_000));

        assert!(matches!(
            result,
            Err(BundleError::InvalidInput(
                InvalidInputError::NoNonStackableDiscount
            ))
        ));
    }

    #[test]
    fn product_currency_must_match_budget() -> TestResult {
        let products = [Product::new("1", "Imported", Money::from_minor(1000, GBP))];
        let discounts = DiscountCatalog::new(
            vec![],
            vec![Discount::percentage_off("Flash Sale", percent(25))],
        );

        let result = compute_bundles(&products, &discounts, budget(10_000));

        assert!(matches!(result, Err(BundleError::Money(_))));

        Ok(())
    }

    #[test]
    fn compute_bundles_is_idempotent() -> TestResult {
        let first = compute_bundles(&edibles(), &discounts(), budget(6000))?;
        let second = compute_bundles(&edibles(), &discounts(), budget(6000))?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn totals_are_sums_within_budget() -> TestResult {
        for minor in [1000, 2500, 6000, 10_000] {
            let bundles = compute_bundles(&edibles(), &discounts(), budget(minor))?;

            for bundle in &bundles {
                let sum: i64 = bundle
                    .items()
                    .iter()
                    .map(|item| item.discounted_price.to_minor_units())
                    .sum();

                assert_eq!(bundle.total().to_minor_units(), sum, "{} total", bundle.kind());
                assert!(sum <= minor, "{} over budget {minor}", bundle.kind());
            }

            let [savings, most, premium] = &bundles;

            assert!(most.len() >= savings.len(), "most items has fewer items");
            assert!(premium.len() <= PREMIUM_CANDIDATES, "premium too large");
        }

        Ok(())
    }

    #[test]
    fn savings_summary() -> TestResult {
        let model = DiscountModel::new(&discounts(), budget(10_000))?;
        let bundle = premium_selection(&edibles(), &model, budget(10_000))?;

        assert_eq!(bundle.subtotal()?, Money::from_minor(8800, USD));
        assert_eq!(bundle.savings()?, Money::from_minor(2200, USD));
        assert_eq!(
            bundle.savings_percent()?,
            Percentage::from(Decimal::new(25, 2))
        );

        assert_eq!(
            bundle.items().first().map(BundleItem::savings).transpose()?,
            Some(Money::from_minor(1000, USD))
        );

        Ok(())
    }

    #[test]
    fn empty_bundle_has_zero_savings_percent() -> TestResult {
        let bundle = Bundle::new(BundleKind::MostItems, USD);

        assert_eq!(bundle.savings_percent()?, Percentage::from(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn bundle_kind_labels_and_markers() {
        assert_eq!(BundleKind::MaximumSavings.to_string(), "Maximum Savings");
        assert_eq!(BundleKind::MostItems.marker(), "📦");
        assert_eq!(
            BundleKind::PremiumSelection.stacking_mode(),
            StackingMode::NonStackable
        );
    }
}
