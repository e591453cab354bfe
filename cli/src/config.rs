//! Configuration management for the kardex reporting tool
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with KARDEX__ prefix

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

use shared::expiration::{ClassifierOptions, DEFAULT_HORIZON_MONTHS};
use shared::packaging::NegativePolicy;

/// Main tool configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Settings {
    /// Current environment (development, production)
    pub environment: String,

    /// Lot expiration dashboard settings
    #[validate]
    pub expiration: ExpirationSettings,

    /// Quantity input handling
    pub quantities: QuantitySettings,

    /// Report output
    pub output: OutputSettings,

    /// Location of exported records
    pub data: DataSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ExpirationSettings {
    /// Near-expiry horizon in calendar months
    #[validate(range(min = 1, max = 120))]
    pub horizon_months: u32,
}

impl ExpirationSettings {
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            horizon_months: self.horizon_months,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuantitySettings {
    /// Whether negative quantity inputs are rejected or clamped to zero
    pub negative_policy: NegativePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    /// Directory holding products.json, lots.json and movements.json
    pub directory: PathBuf,
}

/// Report output format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Settings {
    fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("expiration.horizon_months", i64::from(DEFAULT_HORIZON_MONTHS))?
            .set_default("quantities.negative_policy", "reject")?
            .set_default("output.format", "text")?
            .set_default("data.directory", "data")
    }

    /// Load configuration from files and environment variables
    pub fn load(environment: Option<&str>) -> Result<Self, ConfigError> {
        let environment = match environment {
            Some(environment) => environment.to_string(),
            None => std::env::var("KARDEX_ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        };

        let config = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (KARDEX__ prefix)
            .add_source(
                Environment::with_prefix("KARDEX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
