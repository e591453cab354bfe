//! Pharmacy inventory reports - Kardex, lot expiration and quantity tools
//!
//! Works over JSON exports of the product catalog, lots and movements.
//!
//! # Usage
//!
//! ```bash
//! # Running-balance ledger of one product
//! kardex ledger --product 7f1c...
//!
//! # Expiration dashboard as of a given date, near-expiry tab only
//! kardex --today 2024-01-15 expiration --tab near-expiry
//!
//! # 111 units of a 36-unit box
//! kardex quantity split 111 --size 36
//!
//! # Per-product totals of a purchase detail
//! kardex --format json lines purchase.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator::Validate;

use shared::sources::{Clock, FixedClock, SystemClock};

mod commands;
mod config;
mod data;
mod error;
mod render;

use commands::{Context, ExpirationArgs, LedgerArgs, LinesArgs, QuantityArgs};
use crate::config::{OutputFormat, Settings};
use error::CliResult;

#[derive(Parser)]
#[command(name = "kardex")]
#[command(author, version, about = "Pharmacy inventory accounting reports")]
struct Cli {
    /// Configuration environment (reads config/<environment>.toml)
    #[arg(short, long, global = true)]
    environment: Option<String>,

    /// Directory holding products.json, lots.json and movements.json
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Reference date (YYYY-MM-DD) instead of the local calendar date
    #[arg(long, global = true, value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Running-balance ledger of one product
    Ledger(LedgerArgs),
    /// Lots grouped by product and expiration bucket
    Expiration(ExpirationArgs),
    /// Convert between base units and packages
    Quantity(QuantityArgs),
    /// Per-product totals of a purchase or sale detail
    Lines(LinesArgs),
}

fn parse_today(value: &str) -> Result<NaiveDate, String> {
    shared::parse_date_only(value).map_err(|e| e.to_string())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kardex=info,shared=info".into());

    // Reports go to stdout; logs stay on stderr
    let (plain, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.environment.as_deref())?;
    if let Some(directory) = &cli.data_dir {
        settings.data.directory = directory.clone();
    }
    if let Some(format) = cli.format {
        settings.output.format = format;
    }
    settings.validate()?;
    Ok(settings)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = load_settings(&cli).context("Failed to load configuration")?;
    tracing::debug!(environment = %settings.environment, "configuration loaded");

    let clock: Box<dyn Clock> = match cli.today {
        Some(today) => Box::new(FixedClock(today)),
        None => Box::new(SystemClock),
    };
    let ctx = Context::new(settings, clock);

    let output = match cli.command {
        Commands::Ledger(args) => commands::ledger::run(args, &ctx),
        Commands::Expiration(args) => commands::expiration::run(args, &ctx),
        Commands::Quantity(args) => commands::quantity::run(args, &ctx),
        Commands::Lines(args) => commands::lines::run(args, &ctx),
    }?;

    println!("{}", output.trim_end());
    Ok(())
}
