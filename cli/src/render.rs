//! Plain-text rendering of engine results

use std::fmt::Write;

use shared::expiration::{BucketCounts, ExpirationBucket, ExpirationReport, ProductLots};
use shared::ledger::Kardex;
use shared::line_items::LineSummary;
use shared::packaging::PackagingUnits;
use shared::Product;

fn badge_line(counts: &BucketCounts) -> String {
    format!(
        "Expired: {}  Near expiry: {}  Healthy: {}",
        counts.expired, counts.near_expiry, counts.healthy
    )
}

/// Kardex table with per-row packaging breakdown
pub fn kardex(product: &Product, kardex: &Kardex) -> String {
    let units = product.units();
    let mut out = String::new();

    let _ = writeln!(out, "Kardex: {} (as of {})", product.name, kardex.reference_date);
    let _ = writeln!(
        out,
        "{:<17} {:<6} {:<12} {:<10} {:>8} {:>9}  {}",
        "DATE", "KIND", "DOCUMENT", "BATCH", "QTY", "BALANCE", "BALANCE (PACKAGED)"
    );

    for row in &kardex.rows {
        let movement = &row.movement;
        let _ = writeln!(
            out,
            "{:<17} {:<6} {:<12} {:<10} {:>8} {:>9}  {}",
            movement.timestamp.format("%Y-%m-%d %H:%M"),
            movement.kind.to_string(),
            movement.document_ref.as_deref().unwrap_or("-"),
            movement.batch_code.as_deref().unwrap_or("-"),
            movement.signed_quantity().unwrap_or_default(),
            row.running_balance,
            row.formatted_balance(&units),
        );
    }

    if kardex.is_empty() {
        let _ = writeln!(out, "(no movements)");
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Balance: {} ({})",
        kardex.balance,
        units.format_signed(kardex.balance)
    );
    let _ = writeln!(
        out,
        "In expired lots: {} ({})",
        kardex.expired_balance,
        units.format_signed(kardex.expired_balance)
    );
    let _ = writeln!(out, "Usable: {}", kardex.usable_balance());
    let _ = writeln!(
        out,
        "Entries: {} units, {}  Exits: {} units, {}",
        kardex.total_in, kardex.total_entry_value, kardex.total_out, kardex.total_exit_value
    );
    out
}

fn product_group(out: &mut String, group: &ProductLots) {
    let _ = writeln!(
        out,
        "{}  [{}]  total {}",
        group.product.name,
        badge_line(&group.counts),
        group.total_stock
    );
    for classified in &group.lots {
        let _ = writeln!(
            out,
            "  {:<12} {}  {:<11} {:>6} days  {}",
            classified.lot.batch_code,
            classified.lot.expiration_date,
            classified.bucket.to_string(),
            classified.days_until_expiry,
            classified.formatted_stock,
        );
    }
}

/// Expiration dashboard, optionally limited to one bucket
pub fn expiration(report: &ExpirationReport, tab: Option<ExpirationBucket>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lots as of {} (near-expiry horizon {}, {} months)",
        report.reference_date, report.horizon_date, report.horizon_months
    );
    let _ = writeln!(out, "{}", badge_line(&report.counts));

    let groups = match tab {
        Some(bucket) => report.only(bucket),
        None => report.groups.clone(),
    };
    if groups.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "(no lots)");
    }
    for group in &groups {
        let _ = writeln!(out);
        product_group(&mut out, group);
    }
    out
}

/// Document lines grouped by product
pub fn lines(summary: &LineSummary) -> String {
    let mut out = String::new();
    for product in &summary.products {
        let _ = writeln!(
            out,
            "{:<30} {:>3} lines  {:<28} subtotal {}",
            product.product.name,
            product.line_count(),
            product.formatted_quantity,
            product.subtotal
        );
    }
    let totals = &summary.totals;
    let _ = writeln!(
        out,
        "Products: {}  Lines: {}  Gross: {}  Discount: {}  Total: {}",
        totals.product_count, totals.line_count, totals.gross, totals.discount, totals.total
    );
    out
}

/// Packaged breakdown of a single quantity
pub fn quantity(units: &PackagingUnits, total: u64) -> String {
    let split = units.decompose(total);
    format!(
        "{}\npackages: {}  loose units: {}  total: {}\n",
        units.format(total),
        split.packages,
        split.loose_units,
        total
    )
}
