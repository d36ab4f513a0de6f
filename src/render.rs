//! Bundle tables for terminal output

use std::io;

use rust_decimal::Decimal;
use rusty_money::MoneyError;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{bundles::Bundle, discounts::fraction};

/// Errors raised while rendering bundles.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Write each bundle as a heading, an item table and a savings summary.
///
/// # Errors
///
/// Returns a [`RenderError`] if savings can't be calculated or the output can't be written.
pub fn write_bundles(mut out: impl io::Write, bundles: &[Bundle<'_>]) -> Result<(), RenderError> {
    for bundle in bundles {
        write_bundle(&mut out, bundle)?;
    }

    Ok(())
}

fn write_bundle(out: &mut impl io::Write, bundle: &Bundle<'_>) -> Result<(), RenderError> {
    let kind = bundle.kind();

    writeln!(out, "\n{} \x1b[1m{}\x1b[0m", kind.marker(), kind.label())
        .map_err(|_err| RenderError::IO)?;

    if bundle.is_empty() {
        return writeln!(out, " No products fit within the budget.\n")
            .map_err(|_err| RenderError::IO);
    }

    write_bundle_table(out, bundle)?;
    write_bundle_summary(out, bundle)
}

fn write_bundle_table(out: &mut impl io::Write, bundle: &Bundle<'_>) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record([
        "",
        "Item",
        "THC",
        "CBD",
        "Base Price",
        "Discounted Price",
        "Savings",
    ]);

    for (idx, item) in bundle.items().iter().enumerate() {
        builder.push_record([
            format!("#{}", idx + 1),
            item.product.name.clone(),
            format!("{}mg", item.product.potency.thc.normalize()),
            format!("{}mg", item.product.potency.cbd.normalize()),
            item.product.price.to_string(),
            item.discounted_price.to_string(),
            format!("-{}", item.savings()?),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..7), Alignment::right());
    table.modify(Columns::new(5..6), Color::FG_GREEN);

    writeln!(out, "{table}").map_err(|_err| RenderError::IO)
}

fn write_bundle_summary(out: &mut impl io::Write, bundle: &Bundle<'_>) -> Result<(), RenderError> {
    let savings_points =
        (fraction(bundle.savings_percent()?) * Decimal::ONE_HUNDRED).round_dp(2);

    let discounts = if bundle.discounts().is_empty() {
        "none".to_string()
    } else {
        bundle.discounts().join(", ")
    };

    let lines = [
        (" Subtotal:", bundle.subtotal()?.to_string()),
        (" Total:", format!("\x1b[1m{}\x1b[0m", bundle.total())),
        (" Savings:", format!("({savings_points:.2}%) {}", bundle.savings()?)),
        (" Discounts:", discounts),
    ];

    for (label, value) in lines {
        writeln!(out, "{label:<12} {value}").map_err(|_err| RenderError::IO)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        bundles::{Bundle, BundleKind, compute_bundles},
        discounts::{Discount, DiscountCatalog},
        products::{Potency, Product},
    };

    use super::*;

    fn rendered(bundles: &[Bundle<'_>]) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        write_bundles(&mut out, bundles)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn renders_items_and_summary() -> TestResult {
        let products = [Product::new("1", "CBD Gummies", Money::from_minor(4000, USD))
            .with_potency(Potency::new(Decimal::ZERO, Decimal::from(100)))];

        let discounts = DiscountCatalog::new(
            vec![Discount::percentage_off(
                "Weekend Special",
                Percentage::from(Decimal::new(20, 2)),
            )],
            vec![Discount::percentage_off(
                "Flash Sale",
                Percentage::from(Decimal::new(25, 2)),
            )],
        );

        let bundles = compute_bundles(&products, &discounts, Money::from_minor(10_000, USD))?;
        let output = rendered(&bundles)?;

        assert!(output.contains("💰"), "missing marker: {output}");
        assert!(output.contains("Maximum Savings"), "missing label: {output}");
        assert!(output.contains("CBD Gummies"), "missing item: {output}");
        assert!(output.contains("100mg"), "missing potency: {output}");
        assert!(output.contains("(20.00%)"), "missing savings: {output}");
        assert!(output.contains("(25.00%)"), "missing premium savings: {output}");
        assert!(output.contains("Weekend Special"), "missing discount: {output}");

        Ok(())
    }

    #[test]
    fn renders_empty_bundle_notice() -> TestResult {
        let output = rendered(&[Bundle::new(BundleKind::PremiumSelection, USD)])?;

        assert!(output.contains("Premium Selection"), "missing label: {output}");
        assert!(output.contains("No products fit"), "missing notice: {output}");

        Ok(())
    }
}
