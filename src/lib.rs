//! Budtender
//!
//! Budget-constrained bundle recommendations. Given a budget, a discount catalog
//! and candidate products, Budtender builds three bundles: maximum savings, most
//! items and a premium selection, each priced with the applicable discounts.

pub mod bundles;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod pipeline;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod render;
