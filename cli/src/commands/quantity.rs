//! Packaged quantity conversions.

use anyhow::Result;
use serde::Serialize;

use shared::packaging::{decompose_signed, recompose_signed, PackagedQuantity, PackagingUnits};
use shared::sources::ProductSource;
use shared::EngineError;

use super::{Context, PackagingArgs, QuantityArgs, QuantityCommand};
use crate::render;

/// Result of a split or combine
#[derive(Debug, Serialize)]
struct Conversion {
    total: u64,
    packages: u64,
    loose_units: u64,
    formatted: String,
}

impl Conversion {
    fn new(units: &PackagingUnits, total: u64) -> Self {
        let PackagedQuantity {
            packages,
            loose_units,
        } = units.decompose(total);
        Self {
            total,
            packages,
            loose_units,
            formatted: units.format(total),
        }
    }
}

/// Run the quantity command.
pub fn run(args: QuantityArgs, ctx: &Context) -> Result<String> {
    let policy = ctx.settings.quantities.negative_policy;

    let (units, total) = match args.command {
        QuantityCommand::Split { total, packaging } => {
            let units = resolve_units(&packaging, ctx)?;
            let split = decompose_signed(total, i64::from(units.size), policy)?;
            let total = units.recompose(split);
            (units, total)
        }
        QuantityCommand::Combine {
            packages,
            loose,
            packaging,
        } => {
            let units = resolve_units(&packaging, ctx)?;
            let total = recompose_signed(packages, loose, i64::from(units.size), policy)?;
            (units, total)
        }
    };

    let conversion = Conversion::new(&units, total);
    ctx.emit(&conversion, |conversion| {
        render::quantity(&units, conversion.total)
    })
}

fn resolve_units(packaging: &PackagingArgs, ctx: &Context) -> Result<PackagingUnits> {
    match packaging.product {
        Some(id) => {
            let products = ctx.data().products()?;
            let product = products
                .product(id)
                .ok_or(EngineError::UnknownProduct(id))?;
            Ok(product.units())
        }
        None => {
            // Non-positive sizes mean "sold by the unit"
            let size = u32::try_from(packaging.size.max(1)).unwrap_or(u32::MAX);
            Ok(PackagingUnits::new(
                size,
                packaging.package_name.as_str(),
                packaging.unit_name.as_str(),
            ))
        }
    }
}
