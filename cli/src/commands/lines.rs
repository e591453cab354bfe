//! Purchase and sale detail summaries.

use anyhow::Result;

use shared::line_items::summarize_lines;

use super::{Context, LinesArgs};
use crate::data::read_lines;
use crate::render;

/// Run the lines command.
pub fn run(args: LinesArgs, ctx: &Context) -> Result<String> {
    let lines = read_lines(&args.file)?;
    let products = ctx.data().products()?;
    let summary = summarize_lines(lines, &products)?;
    tracing::info!(
        products = summary.totals.product_count,
        lines = summary.totals.line_count,
        total = %summary.totals.total,
        "summarized document"
    );
    ctx.emit(&summary, render::lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, data_dir, PRODUCT};
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use std::fs;

    #[test]
    fn test_lines_summary() {
        let dir = data_dir();
        let file = dir.path().join("purchase.json");
        fs::write(
            &file,
            format!(
                r#"[
                    {{"product_id":"{p}","quantity":40,"unit_price":"0.50","batch_code":"A"}},
                    {{"product_id":"{p}","quantity":36,"unit_price":"0.50","discount":"2.00","batch_code":"B"}}
                ]"#,
                p = PRODUCT
            ),
        )
        .unwrap();
        let ctx = context(dir.path(), OutputFormat::Text);

        let out = run(LinesArgs { file }, &ctx).unwrap();
        assert!(out.contains("Amoxicillin 500mg"));
        assert!(out.contains("2 Boxes (36) and 4 Units"));
        assert!(out.contains("Products: 1  Lines: 2"));
    }

    #[test]
    fn test_missing_lines_file() {
        let dir = data_dir();
        let ctx = context(dir.path(), OutputFormat::Text);
        let err = run(
            LinesArgs {
                file: dir.path().join("nope.json"),
            },
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingDataFile(_))
        ));
    }
}
