//! Budtender prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bundles::{
        Bundle, BundleError, BundleItem, BundleKind, compute_bundles, maximum_savings, most_items,
        premium_selection,
    },
    catalog::{
        Catalog, CatalogError, CategoryResolver, DiscountSource, InventorySource,
        ResolvedCategory,
    },
    discounts::{Discount, DiscountCatalog, DiscountError, DiscountValue},
    fixtures::{FixtureError, default_catalog, load_catalog},
    pipeline::{BundleRequest, PipelineError, Recommendation, recommend},
    pricing::{DiscountModel, InvalidInputError, StackingMode},
    products::{Potency, Product},
};
