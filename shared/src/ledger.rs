//! Kardex: running-balance ledger over a product's stock movements
//!
//! Movements are ordered by timestamp (ties keep their delivery order) and
//! folded into a running balance. Alongside the balance the fold tracks how
//! many units sit in lots that are expired *as of the reference date*.
//!
//! The expired figure reclassifies every historical movement against the
//! reference date rather than the date the movement happened. An exit from a
//! lot that has since expired therefore lowers the figure even if the lot was
//! still valid at the time of the exit. It answers "how much of the stock
//! moved belongs to lots that are expired now", not a point-in-time history.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{MovementInput, MovementKind, MovementRecord};
use crate::packaging::PackagingUnits;
use crate::sources::{Clock, MovementSource};

/// A movement together with the balance right after it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    #[serde(flatten)]
    pub movement: MovementRecord,
    pub running_balance: i64,
    /// Change this movement made to the expired-lot figure
    pub expired_balance_delta: i64,
}

impl LedgerRow {
    pub fn formatted_balance(&self, units: &PackagingUnits) -> String {
        units.format_signed(self.running_balance)
    }

    pub fn formatted_quantity(&self, units: &PackagingUnits) -> String {
        units.format(self.movement.quantity())
    }
}

/// Folded ledger of one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kardex {
    /// Date the expired figure was computed against
    pub reference_date: NaiveDate,
    pub rows: Vec<LedgerRow>,
    /// Stock after the last movement
    pub balance: i64,
    /// Units currently sitting in expired lots
    pub expired_balance: i64,
    pub total_in: u64,
    pub total_out: u64,
    pub total_entry_value: Decimal,
    pub total_exit_value: Decimal,
}

impl Kardex {
    fn empty(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            rows: Vec::new(),
            balance: 0,
            expired_balance: 0,
            total_in: 0,
            total_out: 0,
            total_entry_value: Decimal::ZERO,
            total_exit_value: Decimal::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stock that is not in an expired lot
    pub fn usable_balance(&self) -> i64 {
        self.balance.saturating_sub(self.expired_balance)
    }
}

/// Validate a delivered batch of movements
pub fn ingest(inputs: impl IntoIterator<Item = MovementInput>) -> EngineResult<Vec<MovementRecord>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            input.validate(index).map_err(|err| {
                tracing::warn!(index, error = %err, "rejected movement");
                err
            })
        })
        .collect()
}

/// Validate a batch of movements that must all belong to `product_id`
pub fn ingest_for(
    product_id: Uuid,
    inputs: impl IntoIterator<Item = MovementInput>,
) -> EngineResult<Vec<MovementRecord>> {
    let records = ingest(inputs)?;
    if let Some((index, foreign)) = records
        .iter()
        .enumerate()
        .find(|(_, record)| record.product_id != product_id)
    {
        tracing::warn!(index, %product_id, found = %foreign.product_id, "foreign movement");
        return Err(EngineError::ForeignMovement {
            index,
            expected: product_id,
            found: foreign.product_id,
        });
    }
    Ok(records)
}

/// Whether a movement's lot is expired as of `today`
pub fn is_expired_as_of(record: &MovementRecord, today: NaiveDate) -> bool {
    record
        .expiration_date
        .map_or(false, |expiration| expiration < today)
}

/// Order and fold validated movements into a [`Kardex`]
pub fn fold(mut records: Vec<MovementRecord>, today: NaiveDate) -> EngineResult<Kardex> {
    // Stable: equal timestamps keep their delivery order
    records.sort_by_key(|record| record.timestamp);

    let mut kardex = Kardex::empty(today);
    kardex.rows.reserve(records.len());

    for record in records {
        let signed = record.signed_quantity()?;
        kardex.balance = kardex
            .balance
            .checked_add(signed)
            .ok_or(EngineError::QuantityOverflow("accumulating the running balance"))?;

        let expired_delta = if is_expired_as_of(&record, today) {
            signed
        } else {
            0
        };
        kardex.expired_balance = kardex
            .expired_balance
            .checked_add(expired_delta)
            .ok_or(EngineError::QuantityOverflow("accumulating the expired balance"))?;

        match record.kind {
            MovementKind::Entry => {
                kardex.total_in = kardex
                    .total_in
                    .checked_add(record.quantity_in)
                    .ok_or(EngineError::QuantityOverflow("summing entries"))?;
                kardex.total_entry_value = kardex
                    .total_entry_value
                    .checked_add(record.total_value)
                    .ok_or(EngineError::AmountOverflow("summing entry values"))?;
            }
            MovementKind::Exit => {
                kardex.total_out = kardex
                    .total_out
                    .checked_add(record.quantity_out)
                    .ok_or(EngineError::QuantityOverflow("summing exits"))?;
                kardex.total_exit_value = kardex
                    .total_exit_value
                    .checked_add(record.total_value)
                    .ok_or(EngineError::AmountOverflow("summing exit values"))?;
            }
        }

        kardex.rows.push(LedgerRow {
            movement: record,
            running_balance: kardex.balance,
            expired_balance_delta: expired_delta,
        });
    }

    tracing::debug!(
        rows = kardex.rows.len(),
        balance = kardex.balance,
        expired_balance = kardex.expired_balance,
        "folded kardex"
    );

    Ok(kardex)
}

/// Fetch, validate and fold the movements of `product_id`
pub fn build_kardex<S, C>(source: &S, product_id: Uuid, clock: &C) -> EngineResult<Kardex>
where
    S: MovementSource + ?Sized,
    C: Clock + ?Sized,
{
    let records = ingest_for(product_id, source.movements_for(product_id))?;
    fold(records, clock.today())
}
