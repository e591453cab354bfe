//! Conversion between base-unit quantities and "packages + loose units"
//!
//! Every screen that shows or accepts packaged quantities (purchase entry,
//! sale detail, product table, lot dashboard) goes through this module.
//! A packaging size of 0 or 1 means the product has no packaging: the whole
//! quantity is expressed in loose units.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A quantity split into whole packages and remaining base units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PackagedQuantity {
    pub packages: u64,
    pub loose_units: u64,
}

fn effective_size(packaging_size: u32) -> u32 {
    packaging_size.max(1)
}

/// Split `total` base units into packages of `packaging_size`
pub fn decompose(total: u64, packaging_size: u32) -> PackagedQuantity {
    let size = u64::from(effective_size(packaging_size));
    if size == 1 {
        return PackagedQuantity {
            packages: 0,
            loose_units: total,
        };
    }
    PackagedQuantity {
        packages: total / size,
        loose_units: total % size,
    }
}

/// Combine packages and loose units back into base units.
///
/// The package count is ignored for unpackaged products.
pub fn recompose(packages: u64, loose_units: u64, packaging_size: u32) -> u64 {
    let size = u64::from(effective_size(packaging_size));
    if size == 1 {
        return loose_units;
    }
    packages.saturating_mul(size).saturating_add(loose_units)
}

/// Carry loose units that fill whole packages into the package count
pub fn normalize(packages: u64, loose_units: u64, packaging_size: u32) -> PackagedQuantity {
    decompose(recompose(packages, loose_units, packaging_size), packaging_size)
}

/// How a call site treats negative quantities coming from signed inputs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NegativePolicy {
    /// Fail with [`EngineError::NegativeQuantity`]
    #[default]
    Reject,
    /// Treat negative values as zero
    Clamp,
}

impl NegativePolicy {
    pub fn apply(self, field: &'static str, value: i64) -> EngineResult<u64> {
        match u64::try_from(value) {
            Ok(value) => Ok(value),
            Err(_) => match self {
                NegativePolicy::Reject => Err(EngineError::NegativeQuantity { field, value }),
                NegativePolicy::Clamp => Ok(0),
            },
        }
    }
}

fn clamp_size(packaging_size: i64) -> u32 {
    u32::try_from(packaging_size.max(1)).unwrap_or(u32::MAX)
}

/// [`decompose`] for signed inputs; the packaging size is clamped to at least 1
pub fn decompose_signed(
    total: i64,
    packaging_size: i64,
    policy: NegativePolicy,
) -> EngineResult<PackagedQuantity> {
    let total = policy.apply("total", total)?;
    Ok(decompose(total, clamp_size(packaging_size)))
}

/// [`recompose`] for signed form inputs
pub fn recompose_signed(
    packages: i64,
    loose_units: i64,
    packaging_size: i64,
    policy: NegativePolicy,
) -> EngineResult<u64> {
    let packages = policy.apply("packages", packages)?;
    let loose_units = policy.apply("loose_units", loose_units)?;
    Ok(recompose(packages, loose_units, clamp_size(packaging_size)))
}

/// Unit cost derived from the price of a full package, rounded to 4 decimal places
pub fn unit_cost_from_package_price(package_price: Decimal, packaging_size: u32) -> Decimal {
    let size = effective_size(packaging_size);
    (package_price / Decimal::from(size)).round_dp(4)
}

/// Packaging vocabulary of a product, used to convert and render quantities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackagingUnits {
    pub size: u32,
    pub package_name: String,
    pub unit_name: String,
}

impl PackagingUnits {
    pub fn new(size: u32, package_name: impl Into<String>, unit_name: impl Into<String>) -> Self {
        Self {
            size: effective_size(size),
            package_name: package_name.into(),
            unit_name: unit_name.into(),
        }
    }

    /// Units for a product without packaging
    pub fn loose(unit_name: impl Into<String>) -> Self {
        Self::new(1, String::new(), unit_name)
    }

    pub fn is_packaged(&self) -> bool {
        self.size > 1
    }

    pub fn decompose(&self, total: u64) -> PackagedQuantity {
        decompose(total, self.size)
    }

    pub fn recompose(&self, quantity: PackagedQuantity) -> u64 {
        recompose(quantity.packages, quantity.loose_units, self.size)
    }

    /// Render a quantity such as `3 Boxes (36) and 3 Units`.
    ///
    /// Zero components are omitted; zero renders as `0 Units`.
    pub fn format(&self, total: u64) -> String {
        let split = self.decompose(total);
        let packages = (split.packages > 0).then(|| {
            format!(
                "{} {} ({})",
                split.packages,
                pluralize(&self.package_name, split.packages),
                self.size
            )
        });
        let loose = (split.loose_units > 0).then(|| {
            format!(
                "{} {}",
                split.loose_units,
                pluralize(&self.unit_name, split.loose_units)
            )
        });

        match (packages, loose) {
            (Some(packages), Some(loose)) => format!("{} and {}", packages, loose),
            (Some(packages), None) => packages,
            (None, Some(loose)) => loose,
            (None, None) => format!("0 {}", pluralize(&self.unit_name, 0)),
        }
    }

    /// Render a signed balance; negatives are prefixed with `-`
    pub fn format_signed(&self, total: i64) -> String {
        let rendered = self.format(total.unsigned_abs());
        if total < 0 {
            format!("-{}", rendered)
        } else {
            rendered
        }
    }
}

/// English plural of a unit noun for `count`
pub fn pluralize(noun: &str, count: u64) -> String {
    if count == 1 || noun.is_empty() {
        return noun.to_string();
    }
    let lower = noun.to_lowercase();
    let sibilant = ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|ending| lower.ends_with(ending));
    if sibilant {
        format!("{}es", noun)
    } else {
        format!("{}s", noun)
    }
}
