//! Expiration risk classification of lots
//!
//! Lots with stock are placed in exactly one bucket relative to a reference
//! date and a horizon of calendar months:
//!
//! - `Expired`: expires before the reference date
//! - `NearExpiry`: expires between the reference date and the horizon date, both inclusive
//! - `Healthy`: expires after the horizon date
//!
//! All comparisons are on calendar dates. Lots with zero stock are left out;
//! negative stock is rejected with [`EngineError::NegativeQuantity`].

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grouping::group_by;
use crate::models::{Lot, ProductSummary};
use crate::sources::{Clock, LotSource, ProductSource};
use crate::types::DateRange;

pub const DEFAULT_HORIZON_MONTHS: u32 = 3;

fn default_horizon_months() -> u32 {
    DEFAULT_HORIZON_MONTHS
}

/// Classifier options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierOptions {
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

/// Expiration risk bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationBucket {
    Expired,
    NearExpiry,
    Healthy,
}

impl ExpirationBucket {
    pub const ALL: [ExpirationBucket; 3] = [
        ExpirationBucket::Expired,
        ExpirationBucket::NearExpiry,
        ExpirationBucket::Healthy,
    ];
}

impl std::fmt::Display for ExpirationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpirationBucket::Expired => write!(f, "Expired"),
            ExpirationBucket::NearExpiry => write!(f, "Near Expiry"),
            ExpirationBucket::Healthy => write!(f, "Healthy"),
        }
    }
}

/// Add calendar months, clamping the day to the end of a shorter month
pub fn add_months(date: NaiveDate, months: u32) -> EngineResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| EngineError::InvalidDate(format!("{} + {} months", date, months)))
}

/// Bucket of an expiration date given the reference and horizon dates
pub fn bucket_for(
    expiration: NaiveDate,
    reference: NaiveDate,
    horizon: NaiveDate,
) -> ExpirationBucket {
    if expiration < reference {
        ExpirationBucket::Expired
    } else if expiration <= horizon {
        ExpirationBucket::NearExpiry
    } else {
        ExpirationBucket::Healthy
    }
}

/// Per-bucket lot counts, used for dashboard badges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BucketCounts {
    pub expired: usize,
    pub near_expiry: usize,
    pub healthy: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: ExpirationBucket) -> usize {
        match bucket {
            ExpirationBucket::Expired => self.expired,
            ExpirationBucket::NearExpiry => self.near_expiry,
            ExpirationBucket::Healthy => self.healthy,
        }
    }

    fn increment(&mut self, bucket: ExpirationBucket) {
        match bucket {
            ExpirationBucket::Expired => self.expired += 1,
            ExpirationBucket::NearExpiry => self.near_expiry += 1,
            ExpirationBucket::Healthy => self.healthy += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.expired + self.near_expiry + self.healthy
    }
}

/// A lot with its computed bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedLot {
    #[serde(flatten)]
    pub lot: Lot,
    pub bucket: ExpirationBucket,
    /// Negative once the lot has expired
    pub days_until_expiry: i64,
    pub formatted_stock: String,
}

/// Classified lots of one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductLots {
    pub product: ProductSummary,
    pub lots: Vec<ClassifiedLot>,
    pub counts: BucketCounts,
    pub total_stock: i64,
}

/// Result of classifying a set of lots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpirationReport {
    pub reference_date: NaiveDate,
    pub horizon_date: NaiveDate,
    pub horizon_months: u32,
    pub groups: Vec<ProductLots>,
    pub counts: BucketCounts,
}

impl ExpirationReport {
    /// All lots of one bucket, in group order
    pub fn bucket(&self, bucket: ExpirationBucket) -> Vec<&ClassifiedLot> {
        self.groups
            .iter()
            .flat_map(|group| group.lots.iter())
            .filter(|lot| lot.bucket == bucket)
            .collect()
    }

    /// Groups restricted to lots of one bucket; groups left empty are dropped
    pub fn only(&self, bucket: ExpirationBucket) -> Vec<ProductLots> {
        self.groups
            .iter()
            .filter_map(|group| {
                let lots: Vec<ClassifiedLot> = group
                    .lots
                    .iter()
                    .filter(|lot| lot.bucket == bucket)
                    .cloned()
                    .collect();
                if lots.is_empty() {
                    return None;
                }
                let mut counts = BucketCounts::default();
                lots.iter().for_each(|lot| counts.increment(lot.bucket));
                Some(ProductLots {
                    product: group.product.clone(),
                    total_stock: lots.iter().map(|lot| lot.lot.remaining_stock).sum(),
                    lots,
                    counts,
                })
            })
            .collect()
    }

    pub fn lot_count(&self) -> usize {
        self.counts.total()
    }
}

/// Partitions lots into expiration buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpirationClassifier {
    options: ClassifierOptions,
}

impl ExpirationClassifier {
    /// Create a classifier; a zero-month horizon is a configuration error
    pub fn new(options: ClassifierOptions) -> EngineResult<Self> {
        if options.horizon_months == 0 {
            return Err(EngineError::InvalidConfiguration(
                "horizon_months must be greater than 0".to_string(),
            ));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> ClassifierOptions {
        self.options
    }

    pub fn horizon_date(&self, reference: NaiveDate) -> EngineResult<NaiveDate> {
        add_months(reference, self.options.horizon_months)
    }

    /// Bucket of a single lot, or `None` when it has no stock
    pub fn classify_lot(
        &self,
        lot: &Lot,
        reference: NaiveDate,
    ) -> EngineResult<Option<ExpirationBucket>> {
        if !lot.has_stock()? {
            return Ok(None);
        }
        let horizon = self.horizon_date(reference)?;
        Ok(Some(bucket_for(lot.expiration_date, reference, horizon)))
    }

    /// Expiration dates a lot source can narrow to for one bucket
    pub fn window_for(
        &self,
        bucket: ExpirationBucket,
        reference: NaiveDate,
    ) -> EngineResult<DateRange> {
        let horizon = self.horizon_date(reference)?;
        let out_of_range = || EngineError::InvalidDate(format!("window around {}", reference));
        let range = match bucket {
            ExpirationBucket::Expired => {
                let last_expired = reference
                    .checked_sub_days(Days::new(1))
                    .ok_or_else(out_of_range)?;
                DateRange::new(None, Some(last_expired))
            }
            ExpirationBucket::NearExpiry => DateRange::new(Some(reference), Some(horizon)),
            ExpirationBucket::Healthy => {
                let first_healthy = horizon
                    .checked_add_days(Days::new(1))
                    .ok_or_else(out_of_range)?;
                DateRange::new(Some(first_healthy), None)
            }
        };
        Ok(range)
    }

    /// Classify lots and group them by product.
    ///
    /// Lots without stock are dropped and a lot with negative stock fails the
    /// whole call. Every other lot lands in exactly one bucket; its product
    /// must be known to `products`.
    pub fn classify<P>(
        &self,
        lots: impl IntoIterator<Item = Lot>,
        products: &P,
        reference: NaiveDate,
    ) -> EngineResult<ExpirationReport>
    where
        P: ProductSource + ?Sized,
    {
        let horizon = self.horizon_date(reference)?;
        let mut stocked = Vec::new();
        for lot in lots {
            if lot.has_stock()? {
                stocked.push(lot);
            }
        }

        let mut groups = Vec::new();
        let mut counts = BucketCounts::default();

        for (product_id, members) in group_by(stocked, |lot| lot.product_id) {
            let product = products
                .product(product_id)
                .ok_or(EngineError::UnknownProduct(product_id))?;
            let units = product.units();

            let mut group_counts = BucketCounts::default();
            let mut total_stock: i64 = 0;
            let mut classified = Vec::with_capacity(members.len());

            for lot in members {
                let bucket = bucket_for(lot.expiration_date, reference, horizon);
                group_counts.increment(bucket);
                counts.increment(bucket);
                total_stock = total_stock
                    .checked_add(lot.remaining_stock)
                    .ok_or(EngineError::QuantityOverflow("summing lot stock"))?;
                classified.push(ClassifiedLot {
                    days_until_expiry: (lot.expiration_date - reference).num_days(),
                    formatted_stock: units.format_signed(lot.remaining_stock),
                    bucket,
                    lot,
                });
            }

            groups.push(ProductLots {
                product: ProductSummary::from(product),
                lots: classified,
                counts: group_counts,
                total_stock,
            });
        }

        tracing::debug!(
            %reference,
            %horizon,
            products = groups.len(),
            expired = counts.expired,
            near_expiry = counts.near_expiry,
            healthy = counts.healthy,
            "classified lots"
        );

        Ok(ExpirationReport {
            reference_date: reference,
            horizon_date: horizon,
            horizon_months: self.options.horizon_months,
            groups,
            counts,
        })
    }

    /// Fetch lots (narrowed to `tab` when given) and classify them as of the clock's date
    pub fn classify_from_sources<L, P, C>(
        &self,
        lot_source: &L,
        products: &P,
        clock: &C,
        tab: Option<ExpirationBucket>,
    ) -> EngineResult<ExpirationReport>
    where
        L: LotSource + ?Sized,
        P: ProductSource + ?Sized,
        C: Clock + ?Sized,
    {
        let reference = clock.today();
        let window = tab
            .map(|bucket| self.window_for(bucket, reference))
            .transpose()?;
        self.classify(lot_source.lots(window), products, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LotStatus, Product};
    use crate::sources::{FixedClock, InMemoryStore};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn products() -> Vec<Product> {
        vec![
            Product::new(Uuid::from_u128(1), "Amoxicillin 500mg").with_packaging(12, "Box"),
            Product::new(Uuid::from_u128(2), "Ibuprofen 400mg"),
        ]
    }

    fn lot(id: u128, product: u128, expires: NaiveDate, stock: i64) -> Lot {
        Lot {
            id: Uuid::from_u128(id),
            product_id: Uuid::from_u128(product),
            batch_code: format!("L{:03}", id),
            expiration_date: expires,
            remaining_stock: stock,
            status: LotStatus::Active,
        }
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(date(2024, 1, 15), 3).unwrap(), date(2024, 4, 15));
        assert_eq!(add_months(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 11, 30), 3).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 12, 31), 2).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_boundary_scenario() {
        let classifier = ExpirationClassifier::default();
        let reference = date(2024, 1, 15);
        assert_eq!(classifier.horizon_date(reference).unwrap(), date(2024, 4, 15));

        let bucket = |expires| {
            classifier
                .classify_lot(&lot(1, 1, expires, 5), reference)
                .unwrap()
                .unwrap()
        };
        assert_eq!(bucket(date(2024, 4, 15)), ExpirationBucket::NearExpiry);
        assert_eq!(bucket(date(2024, 4, 16)), ExpirationBucket::Healthy);
        assert_eq!(bucket(date(2024, 1, 14)), ExpirationBucket::Expired);
        assert_eq!(bucket(reference), ExpirationBucket::NearExpiry);
    }

    #[test]
    fn test_zero_stock_excluded() {
        let classifier = ExpirationClassifier::default();
        let reference = date(2024, 1, 15);
        assert_eq!(classifier.classify_lot(&lot(1, 1, date(2020, 1, 1), 0), reference).unwrap(), None);

        let report = classifier
            .classify(
                vec![lot(1, 1, date(2020, 1, 1), 0), lot(2, 1, date(2024, 2, 1), 0)],
                &products(),
                reference,
            )
            .unwrap();
        assert!(report.groups.is_empty());
        assert_eq!(report.counts, BucketCounts::default());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let classifier = ExpirationClassifier::default();
        let reference = date(2024, 1, 15);
        let corrupt = lot(2, 1, date(2024, 2, 1), -3);

        assert!(matches!(
            classifier.classify_lot(&corrupt, reference),
            Err(EngineError::NegativeQuantity {
                field: "remaining_stock",
                value: -3
            })
        ));

        let result = classifier.classify(
            vec![lot(1, 1, date(2024, 3, 1), 10), corrupt],
            &products(),
            reference,
        );
        assert!(matches!(
            result,
            Err(EngineError::NegativeQuantity {
                field: "remaining_stock",
                value: -3
            })
        ));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = ExpirationClassifier::new(ClassifierOptions { horizon_months: 0 });
        assert!(matches!(result, Err(EngineError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_custom_horizon() {
        let classifier = ExpirationClassifier::new(ClassifierOptions { horizon_months: 6 }).unwrap();
        let reference = date(2024, 1, 15);
        assert_eq!(classifier.horizon_date(reference).unwrap(), date(2024, 7, 15));
        assert_eq!(
            classifier
                .classify_lot(&lot(1, 1, date(2024, 6, 1), 1), reference)
                .unwrap(),
            Some(ExpirationBucket::NearExpiry)
        );
    }

    #[test]
    fn test_classify_groups_by_product() {
        let reference = date(2024, 1, 15);
        let lots = vec![
            lot(1, 2, date(2025, 1, 1), 10),
            lot(2, 1, date(2024, 1, 1), 30),
            lot(3, 2, date(2024, 2, 1), 4),
            lot(4, 1, date(2024, 3, 1), 13),
        ];
        let report = ExpirationClassifier::default()
            .classify(lots, &products(), reference)
            .unwrap();

        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].product.name, "Ibuprofen 400mg");
        assert_eq!(report.groups[1].product.name, "Amoxicillin 500mg");

        let amoxicillin = &report.groups[1];
        assert_eq!(amoxicillin.total_stock, 43);
        assert_eq!(amoxicillin.counts.expired, 1);
        assert_eq!(amoxicillin.counts.near_expiry, 1);
        assert_eq!(amoxicillin.lots[0].formatted_stock, "2 Boxes (12) and 6 Units");
        assert_eq!(amoxicillin.lots[0].days_until_expiry, -14);

        assert_eq!(
            report.counts,
            BucketCounts {
                expired: 1,
                near_expiry: 2,
                healthy: 1
            }
        );
        let near: Vec<_> = report
            .bucket(ExpirationBucket::NearExpiry)
            .iter()
            .map(|l| l.lot.id)
            .collect();
        assert_eq!(near, vec![Uuid::from_u128(3), Uuid::from_u128(4)]);

        let healthy_only = report.only(ExpirationBucket::Healthy);
        assert_eq!(healthy_only.len(), 1);
        assert_eq!(healthy_only[0].total_stock, 10);
        assert_eq!(healthy_only[0].counts.total(), 1);
    }

    #[test]
    fn test_unknown_product_is_an_error() {
        let result = ExpirationClassifier::default().classify(
            vec![lot(1, 77, date(2025, 1, 1), 1)],
            &products(),
            date(2024, 1, 15),
        );
        assert_eq!(result, Err(EngineError::UnknownProduct(Uuid::from_u128(77))));
    }

    #[test]
    fn test_empty_lot_set() {
        let report = ExpirationClassifier::default()
            .classify(Vec::new(), &products(), date(2024, 1, 15))
            .unwrap();
        assert_eq!(report.lot_count(), 0);
        for bucket in ExpirationBucket::ALL {
            assert!(report.bucket(bucket).is_empty());
        }
    }

    #[test]
    fn test_windows_match_buckets() {
        let classifier = ExpirationClassifier::default();
        let reference = date(2024, 1, 15);
        assert_eq!(
            classifier.window_for(ExpirationBucket::Expired, reference).unwrap(),
            DateRange::new(None, Some(date(2024, 1, 14)))
        );
        assert_eq!(
            classifier.window_for(ExpirationBucket::NearExpiry, reference).unwrap(),
            DateRange::new(Some(reference), Some(date(2024, 4, 15)))
        );
        assert_eq!(
            classifier.window_for(ExpirationBucket::Healthy, reference).unwrap(),
            DateRange::new(Some(date(2024, 4, 16)), None)
        );
    }

    #[test]
    fn test_prefiltered_source_reclassifies_consistently() {
        let store = InMemoryStore::new().with_products(products()).with_lots(vec![
            lot(1, 1, date(2024, 1, 14), 1),
            lot(2, 1, date(2024, 1, 15), 1),
            lot(3, 1, date(2024, 4, 15), 1),
            lot(4, 2, date(2024, 4, 16), 1),
        ]);
        let classifier = ExpirationClassifier::default();
        let clock = FixedClock(date(2024, 1, 15));

        let full = classifier.classify_from_sources(&store, &store, &clock, None).unwrap();
        for bucket in ExpirationBucket::ALL {
            let tab = classifier
                .classify_from_sources(&store, &store, &clock, Some(bucket))
                .unwrap();
            assert_eq!(tab.lot_count(), full.counts.get(bucket));
            assert!(tab.bucket(bucket).len() == tab.lot_count());
        }
    }
}
