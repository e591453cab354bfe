//! Kardex report for one product.

use anyhow::Result;

use shared::ledger::build_kardex;
use shared::sources::ProductSource;
use shared::EngineError;

use super::{Context, LedgerArgs};
use crate::render;

/// Run the ledger command.
pub fn run(args: LedgerArgs, ctx: &Context) -> Result<String> {
    let store = ctx.data().movement_store()?;
    let product = store
        .product(args.product)
        .ok_or(EngineError::UnknownProduct(args.product))?;

    let kardex = build_kardex(&store, args.product, &*ctx.clock)?;
    tracing::info!(
        product = %product.name,
        rows = kardex.rows.len(),
        balance = kardex.balance,
        "built kardex"
    );

    ctx.emit(&kardex, |kardex| render::kardex(product, kardex))
}
