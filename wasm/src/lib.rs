//! WebAssembly module for the pharmacy inventory manager
//!
//! Provides client-side computation for:
//! - Packaged quantity display and order-entry splitting
//! - Kardex running balances
//! - Lot expiration dashboard buckets
//! - Purchase/sale line totals
//!
//! Structured inputs and outputs are exchanged as JSON strings.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::expiration::{ClassifierOptions, ExpirationClassifier};
use shared::ledger;
use shared::line_items;
use shared::packaging::{self, NegativePolicy, PackagingUnits};
use shared::{parse_date_only, EngineError, EngineResult, LineItem, Lot, MovementInput, Product};

// Re-export shared types for use by other Rust consumers
pub use shared::models::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {}

fn js_error(context: &str, err: impl Display) -> JsValue {
    let message = format!("{}: {}", context, err);
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

/// Largest integer a JavaScript number holds exactly (2^53 - 1)
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Calendar date from the browser's local fields, `month0` being zero-based.
///
/// An invalid `Date` reports NaN fields, which arrive here as zeros.
fn calendar_date(year: u32, month0: u32, day: u32) -> EngineResult<NaiveDate> {
    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month0 + 1, day))
        .ok_or_else(|| {
            EngineError::InvalidDate(format!("browser date {}-{}-{}", year, month0 + 1, day))
        })
}

/// Today's date on the browser's local calendar
fn browser_today() -> EngineResult<NaiveDate> {
    let now = js_sys::Date::new_0();
    calendar_date(now.get_full_year(), now.get_month(), now.get_date())
}

/// An explicit `YYYY-MM-DD` (or timestamp) wins over the browser clock
fn reference_date(today: Option<String>) -> Result<NaiveDate, JsValue> {
    match today {
        Some(raw) => parse_date_only(&raw).map_err(|e| js_error("Invalid reference date", e)),
        None => browser_today().map_err(|e| js_error("Browser clock unavailable", e)),
    }
}

/// Base-unit total as a JavaScript number, refusing totals it cannot hold exactly
fn exact_number(total: u64) -> EngineResult<f64> {
    if total > MAX_SAFE_INTEGER {
        return Err(EngineError::QuantityOverflow("exposing a total to JavaScript"));
    }
    Ok(total as f64)
}

fn parse_json<T: serde::de::DeserializeOwned>(label: &str, json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| js_error(&format!("Invalid {} JSON", label), e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization failed", e))
}

/// Render a base-unit quantity, e.g. "3 Boxes (36) and 3 Units"
#[wasm_bindgen]
pub fn format_quantity(
    total: u32,
    packaging_size: u32,
    packaging_name: &str,
    base_unit_name: &str,
) -> String {
    PackagingUnits::new(packaging_size, packaging_name, base_unit_name).format(u64::from(total))
}

/// Split a base-unit quantity into `[packages, loose_units]`
#[wasm_bindgen]
pub fn split_quantity(total: u32, packaging_size: u32) -> Vec<u32> {
    let split = packaging::decompose(u64::from(total), packaging_size);
    // Both parts are bounded by `total`
    vec![split.packages as u32, split.loose_units as u32]
}

/// Combine an order-entry pair back into base units.
///
/// Negative inputs are rejected unless `clamp_negative` is set. Totals above
/// `Number.MAX_SAFE_INTEGER` are rejected rather than rounded.
#[wasm_bindgen]
pub fn combine_quantity(
    packages: i32,
    loose_units: i32,
    packaging_size: i32,
    clamp_negative: bool,
) -> Result<f64, JsValue> {
    let policy = if clamp_negative {
        NegativePolicy::Clamp
    } else {
        NegativePolicy::Reject
    };
    packaging::recompose_signed(
        i64::from(packages),
        i64::from(loose_units),
        i64::from(packaging_size),
        policy,
    )
    .and_then(exact_number)
    .map_err(|e| js_error("Invalid quantity", e))
}

/// Unit cost from a package price, as a decimal string
#[wasm_bindgen]
pub fn unit_cost_from_package_price(
    package_price: &str,
    packaging_size: u32,
) -> Result<String, JsValue> {
    let price = Decimal::from_str(package_price).map_err(|e| js_error("Invalid price", e))?;
    Ok(packaging::unit_cost_from_package_price(price, packaging_size).to_string())
}

/// Build the Kardex of one product from its movement rows
#[wasm_bindgen]
pub fn build_kardex(
    movements_json: &str,
    product_id: &str,
    today: Option<String>,
) -> Result<String, JsValue> {
    let product_id = Uuid::parse_str(product_id).map_err(|e| js_error("Invalid product id", e))?;
    let inputs: Vec<MovementInput> = parse_json("movements", movements_json)?;
    let today = reference_date(today)?;

    let records =
        ledger::ingest_for(product_id, inputs).map_err(|e| js_error("Invalid movements", e))?;
    let kardex = ledger::fold(records, today).map_err(|e| js_error("Kardex failed", e))?;
    to_json(&kardex)
}

/// Classify lots into expiration buckets grouped by product
#[wasm_bindgen]
pub fn classify_lots(
    lots_json: &str,
    products_json: &str,
    today: Option<String>,
    horizon_months: Option<u32>,
) -> Result<String, JsValue> {
    let lots: Vec<Lot> = parse_json("lots", lots_json)?;
    let products: Vec<Product> = parse_json("products", products_json)?;
    let reference = reference_date(today)?;

    let mut options = ClassifierOptions::default();
    if let Some(months) = horizon_months {
        options.horizon_months = months;
    }
    let classifier =
        ExpirationClassifier::new(options).map_err(|e| js_error("Invalid classifier options", e))?;
    let report = classifier
        .classify(lots, &products, reference)
        .map_err(|e| js_error("Classification failed", e))?;
    to_json(&report)
}

/// Group purchase/sale lines by product with subtotals and document totals
#[wasm_bindgen]
pub fn summarize_lines(lines_json: &str, products_json: &str) -> Result<String, JsValue> {
    let lines: Vec<LineItem> = parse_json("lines", lines_json)?;
    let products: Vec<Product> = parse_json("products", products_json)?;
    let summary =
        line_items::summarize_lines(lines, &products).map_err(|e| js_error("Summary failed", e))?;
    to_json(&summary)
}
