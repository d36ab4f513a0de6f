//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Budtender configuration
#[derive(Debug, Parser)]
#[command(
    name = "budtender",
    about = "Recommend product bundles for a budget",
    long_about = None
)]
pub struct Config {
    /// Most the shopper wants to spend, in the catalog currency (e.g., 100 or 42.50)
    #[arg(short, long, env = "BUDTENDER_BUDGET")]
    pub budget: Decimal,

    /// Product category (e.g., edible, flower, vape)
    #[arg(short, long, env = "BUDTENDER_CATEGORY", default_value = "edible")]
    pub category: String,

    /// YAML catalog file; the bundled catalog is used when omitted
    #[arg(short, long, env = "BUDTENDER_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Inventory price ceiling as a multiple of the budget
    #[arg(long, env = "BUDTENDER_HEADROOM", default_value = "1.5")]
    pub headroom: Decimal,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Budget in minor units, or `None` if it doesn't fit in an `i64`
    pub fn budget_minor_units(&self) -> Option<i64> {
        self.budget
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|value| value.round_dp(0).to_i64())
    }
}
