//! Per-product aggregation of purchase and sale detail lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grouping::group_by;
use crate::models::{LineItem, Product, ProductSummary};
use crate::packaging::{recompose, unit_cost_from_package_price};
use crate::sources::ProductSource;

impl LineItem {
    /// Build a line from a package + loose-unit entry priced per base unit
    pub fn from_packaged(product: &Product, packages: u64, loose_units: u64, unit_price: Decimal) -> Self {
        let quantity = recompose(packages, loose_units, product.packaging_size);
        LineItem::new(product.id, quantity, unit_price)
    }

    /// Build a line from a package + loose-unit entry priced per package
    pub fn from_package_price(
        product: &Product,
        packages: u64,
        loose_units: u64,
        package_price: Decimal,
    ) -> Self {
        let unit_price = unit_cost_from_package_price(package_price, product.packaging_size);
        Self::from_packaged(product, packages, loose_units, unit_price)
    }
}

/// Lines of one product on a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductLineSummary {
    pub product: ProductSummary,
    pub quantity: u64,
    pub formatted_quantity: String,
    pub gross: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
    pub lines: Vec<LineItem>,
}

impl ProductLineSummary {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Totals of a whole document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentTotals {
    pub gross: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub quantity: u64,
    pub line_count: usize,
    pub product_count: usize,
}

/// Document lines grouped by product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSummary {
    pub products: Vec<ProductLineSummary>,
    pub totals: DocumentTotals,
}

/// Group lines by product in first-seen order and total them
pub fn summarize_lines<P>(lines: impl IntoIterator<Item = LineItem>, products: &P) -> EngineResult<LineSummary>
where
    P: ProductSource + ?Sized,
{
    let mut totals = DocumentTotals::default();
    let mut summaries = Vec::new();

    for (product_id, members) in group_by(lines, |line| line.product_id) {
        let product = products
            .product(product_id)
            .ok_or(EngineError::UnknownProduct(product_id))?;

        let mut quantity: u64 = 0;
        let mut gross = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        for line in &members {
            quantity = quantity
                .checked_add(line.quantity)
                .ok_or(EngineError::QuantityOverflow("summing line quantities"))?;
            gross = gross
                .checked_add(line.gross()?)
                .ok_or(EngineError::AmountOverflow("summing line amounts"))?;
            discount = discount
                .checked_add(line.discount)
                .ok_or(EngineError::AmountOverflow("summing line discounts"))?;
        }
        let subtotal = gross
            .checked_sub(discount)
            .ok_or(EngineError::AmountOverflow("discounting a product"))?;

        totals.quantity = totals
            .quantity
            .checked_add(quantity)
            .ok_or(EngineError::QuantityOverflow("summing document quantity"))?;
        totals.gross = totals
            .gross
            .checked_add(gross)
            .ok_or(EngineError::AmountOverflow("summing document amounts"))?;
        totals.discount = totals
            .discount
            .checked_add(discount)
            .ok_or(EngineError::AmountOverflow("summing document discounts"))?;
        totals.line_count += members.len();

        summaries.push(ProductLineSummary {
            product: ProductSummary::from(product),
            quantity,
            formatted_quantity: product.units().format(quantity),
            gross,
            discount,
            subtotal,
            lines: members,
        });
    }

    totals.total = totals
        .gross
        .checked_sub(totals.discount)
        .ok_or(EngineError::AmountOverflow("discounting the document"))?;
    totals.product_count = summaries.len();

    Ok(LineSummary {
        products: summaries,
        totals,
    })
}
