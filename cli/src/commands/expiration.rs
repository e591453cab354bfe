//! Lot expiration dashboard.

use anyhow::Result;

use shared::expiration::{ExpirationBucket, ExpirationClassifier};

use super::{Context, ExpirationArgs};
use crate::render;

/// Run the expiration command.
pub fn run(args: ExpirationArgs, ctx: &Context) -> Result<String> {
    let mut options = ctx.settings.expiration.classifier_options();
    if let Some(months) = args.horizon_months {
        options.horizon_months = months;
    }
    let classifier = ExpirationClassifier::new(options)?;
    let tab = args.tab.map(ExpirationBucket::from);

    // Every bucket is classified so the badge counts stay complete under a tab
    let store = ctx.data().lot_store()?;
    let mut report = classifier.classify_from_sources(&store, &store, &*ctx.clock, None)?;
    tracing::info!(
        reference = %report.reference_date,
        horizon = %report.horizon_date,
        lots = report.lot_count(),
        "classified lots"
    );

    if let Some(bucket) = tab {
        report.groups = report.only(bucket);
    }
    ctx.emit(&report, |report| render::expiration(report, tab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, data_dir, PRODUCT};
    use crate::commands::Tab;
    use crate::config::OutputFormat;
    use std::fs;

    fn write_lots(dir: &std::path::Path) {
        let lots = format!(
            r#"[
                {{"id":"00000000-0000-0000-0000-00000000000a","product_id":"{p}","batch_code":"NEAR","expiration_date":"2024-04-15","remaining_stock":111}},
                {{"id":"00000000-0000-0000-0000-00000000000b","product_id":"{p}","batch_code":"GONE","expiration_date":"2024-01-14","remaining_stock":5}},
                {{"id":"00000000-0000-0000-0000-00000000000c","product_id":"{p}","batch_code":"FINE","expiration_date":"2024-04-16","remaining_stock":8}},
                {{"id":"00000000-0000-0000-0000-00000000000d","product_id":"{p}","batch_code":"EMPTY","expiration_date":"2024-02-01","remaining_stock":0}}
            ]"#,
            p = PRODUCT
        );
        fs::write(dir.join("lots.json"), lots).unwrap();
    }

    #[test]
    fn test_expiration_dashboard() {
        let dir = data_dir();
        write_lots(dir.path());
        let ctx = context(dir.path(), OutputFormat::Text);

        let out = run(
            ExpirationArgs {
                tab: None,
                horizon_months: None,
            },
            &ctx,
        )
        .unwrap();
        assert!(out.contains("horizon 2024-04-15, 3 months"));
        assert!(out.contains("Expired: 1  Near expiry: 1  Healthy: 1"));
        assert!(out.contains("3 Boxes (36) and 3 Units"));
        assert!(!out.contains("EMPTY"));
    }

    #[test]
    fn test_expiration_tab_json() {
        let dir = data_dir();
        write_lots(dir.path());
        let ctx = context(dir.path(), OutputFormat::Json);

        let out = run(
            ExpirationArgs {
                tab: Some(Tab::NearExpiry),
                horizon_months: None,
            },
            &ctx,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let lots = value["groups"][0]["lots"].as_array().unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0]["batch_code"], "NEAR");
    }

    #[test]
    fn test_horizon_override() {
        let dir = data_dir();
        write_lots(dir.path());
        let ctx = context(dir.path(), OutputFormat::Text);

        let out = run(
            ExpirationArgs {
                tab: None,
                horizon_months: Some(6),
            },
            &ctx,
        )
        .unwrap();
        assert!(out.contains("Expired: 1  Near expiry: 2  Healthy: 0"));

        let err = run(
            ExpirationArgs {
                tab: None,
                horizon_months: Some(0),
            },
            &ctx,
        )
        .unwrap_err();
        assert!(err.downcast_ref::<shared::EngineError>().is_some());
    }
}
