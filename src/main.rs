//! Budtender CLI
//!
//! Recommends maximum savings, most items and premium selection bundles for a
//! budget and product category.

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use humanize_duration::{Truncate, prelude::DurationExt};
use rust_decimal::Decimal;
use rusty_money::Money;
use thiserror::Error;
use tracing::error;

use budtender::{
    fixtures::{FixtureError, default_catalog, load_catalog},
    pipeline::{BundleRequest, PipelineError, recommend},
    render::{RenderError, write_bundles},
};

use crate::{
    config::Config,
    observability::{ObservabilityError, init_subscriber},
};

mod config;
mod observability;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("budget {0} cannot be represented in minor units")]
    InvalidBudget(Decimal),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn run(config: &Config) -> Result<(), CliError> {
    init_subscriber(&config.logging)?;

    let catalog = match &config.fixture {
        Some(path) => load_catalog(path)?,
        None => default_catalog()?,
    }
    .with_headroom(config.headroom);

    let minor_units = config
        .budget_minor_units()
        .ok_or(CliError::InvalidBudget(config.budget))?;

    let request = BundleRequest::new(
        config.category.clone(),
        Money::from_minor(minor_units, catalog.currency()),
    );

    let start = Instant::now();
    let recommendation = recommend(&catalog, &request)?;
    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(
        handle,
        "{} bundles for {} ({} candidates)",
        recommendation.category.name,
        request.budget,
        recommendation.candidates.len()
    )?;

    write_bundles(&mut handle, &recommendation.bundles)?;

    writeln!(handle, "\n {}", elapsed.human(Truncate::Nano))?;

    Ok(())
}

/// Budtender entry point
pub fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "failed to recommend bundles");

            #[expect(
                clippy::print_stderr,
                reason = "errors must reach the user even when logging is filtered"
            )]
            {
                eprintln!("Error: {err}");
            }

            ExitCode::FAILURE
        }
    }
}
