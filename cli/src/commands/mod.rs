//! Command implementations.

pub mod expiration;
pub mod ledger;
pub mod lines;
pub mod quantity;

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use uuid::Uuid;

use shared::expiration::ExpirationBucket;
use shared::sources::Clock;

use crate::config::{OutputFormat, Settings};
use crate::data::DataDir;

/// Everything a command needs besides its own arguments
pub struct Context {
    pub settings: Settings,
    pub clock: Box<dyn Clock>,
}

impl Context {
    pub fn new(settings: Settings, clock: Box<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    pub fn data(&self) -> DataDir {
        DataDir::new(&self.settings.data.directory)
    }

    /// Render `value` as JSON or through the text renderer, per the configured format
    pub fn emit<T, F>(&self, value: &T, text: F) -> anyhow::Result<String>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        match self.settings.output.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Text => Ok(text(value)),
        }
    }
}

/// Arguments for the ledger command.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Product to build the Kardex for.
    #[arg(short, long)]
    pub product: Uuid,
}

/// Dashboard tab selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tab {
    Expired,
    NearExpiry,
    Healthy,
}

impl From<Tab> for ExpirationBucket {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Expired => ExpirationBucket::Expired,
            Tab::NearExpiry => ExpirationBucket::NearExpiry,
            Tab::Healthy => ExpirationBucket::Healthy,
        }
    }
}

/// Arguments for the expiration command.
#[derive(Args, Debug)]
pub struct ExpirationArgs {
    /// Show a single bucket.
    #[arg(short, long, value_enum)]
    pub tab: Option<Tab>,

    /// Near-expiry horizon in months (overrides configuration).
    #[arg(long)]
    pub horizon_months: Option<u32>,
}

/// Packaging given either by a catalog product or explicitly.
#[derive(Args, Debug, Clone)]
pub struct PackagingArgs {
    /// Take packaging from this catalog product.
    #[arg(long, conflicts_with_all = ["size", "package_name", "unit_name"])]
    pub product: Option<Uuid>,

    /// Base units per package.
    #[arg(short, long, default_value = "1")]
    pub size: i64,

    /// Package name.
    #[arg(long, default_value = "Box")]
    pub package_name: String,

    /// Base unit name.
    #[arg(long, default_value = "Unit")]
    pub unit_name: String,
}

/// Arguments for the quantity command.
#[derive(Args, Debug)]
pub struct QuantityArgs {
    #[command(subcommand)]
    pub command: QuantityCommand,
}

#[derive(Subcommand, Debug)]
pub enum QuantityCommand {
    /// Split a base-unit total into packages and loose units.
    Split {
        /// Total in base units.
        #[arg(allow_hyphen_values = true)]
        total: i64,

        #[command(flatten)]
        packaging: PackagingArgs,
    },
    /// Combine packages and loose units into a base-unit total.
    Combine {
        /// Full packages.
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        packages: i64,

        /// Loose base units.
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        loose: i64,

        #[command(flatten)]
        packaging: PackagingArgs,
    },
}

/// Arguments for the lines command.
#[derive(Args, Debug)]
pub struct LinesArgs {
    /// Purchase or sale detail export (JSON array of lines).
    pub file: PathBuf,
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    use chrono::NaiveDate;
    use shared::packaging::NegativePolicy;
    use shared::sources::FixedClock;
    use tempfile::TempDir;

    use super::Context;
    use crate::config::{
        DataSettings, ExpirationSettings, OutputFormat, OutputSettings, QuantitySettings, Settings,
    };

    pub const PRODUCT: &str = "00000000-0000-0000-0000-000000000001";

    /// Scratch data directory with a one-product catalog, removed on drop
    pub fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("products.json"),
            format!(
                r#"[{{"id":"{}","name":"Amoxicillin 500mg","packaging_size":36,"packaging_name":"Box"}}]"#,
                PRODUCT
            ),
        )
        .unwrap();
        dir
    }

    pub fn context(directory: &Path, format: OutputFormat) -> Context {
        let settings = Settings {
            environment: "test".to_string(),
            expiration: ExpirationSettings { horizon_months: 3 },
            quantities: QuantitySettings {
                negative_policy: NegativePolicy::Reject,
            },
            output: OutputSettings { format },
            data: DataSettings {
                directory: directory.to_path_buf(),
            },
        };
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        Context::new(settings, Box::new(FixedClock(today)))
    }
}
