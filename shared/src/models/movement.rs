//! Stock movement (Kardex entry) models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::types::date_only;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entry",
            MovementKind::Exit => "exit",
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::Entry => write!(f, "Entry"),
            MovementKind::Exit => write!(f, "Exit"),
        }
    }
}

/// Movement row as delivered by the movement source, before validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementInput {
    pub product_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub batch_code: Option<String>,
    #[serde(default, deserialize_with = "date_only::deserialize_option")]
    pub expiration_date: Option<NaiveDate>,
    pub kind: MovementKind,
    #[serde(default)]
    pub quantity_in: i64,
    #[serde(default)]
    pub quantity_out: i64,
    #[serde(default)]
    pub unit_cost: Decimal,
    /// Derived from unit cost and quantity when absent
    pub total_value: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
    pub document_ref: Option<String>,
    #[serde(default)]
    pub concept: String,
    pub user: Option<String>,
}

impl MovementInput {
    /// Validate this row, `index` being its position in the delivered batch
    pub fn validate(self, index: usize) -> EngineResult<MovementRecord> {
        let timestamp = self
            .timestamp
            .ok_or(EngineError::MissingTimestamp { index })?;
        let quantity_in = non_negative("quantity_in", self.quantity_in)?;
        let quantity_out = non_negative("quantity_out", self.quantity_out)?;

        let moved = match self.kind {
            MovementKind::Entry => quantity_in,
            MovementKind::Exit => quantity_out,
        };
        let total_value = match self.total_value {
            Some(value) => value,
            None => self
                .unit_cost
                .checked_mul(Decimal::from(moved))
                .ok_or(EngineError::AmountOverflow("deriving a movement value"))?,
        };

        Ok(MovementRecord {
            product_id: self.product_id,
            lot_id: self.lot_id,
            batch_code: self.batch_code,
            expiration_date: self.expiration_date,
            kind: self.kind,
            quantity_in,
            quantity_out,
            unit_cost: self.unit_cost,
            total_value,
            timestamp,
            document_ref: self.document_ref,
            concept: self.concept,
            user: self.user,
        })
    }
}

fn non_negative(field: &'static str, value: i64) -> EngineResult<u64> {
    u64::try_from(value).map_err(|_| EngineError::NegativeQuantity { field, value })
}

/// A validated, immutable stock movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementRecord {
    pub product_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub batch_code: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub kind: MovementKind,
    /// Units received; only meaningful for entries
    pub quantity_in: u64,
    /// Units dispatched; only meaningful for exits
    pub quantity_out: u64,
    pub unit_cost: Decimal,
    pub total_value: Decimal,
    pub timestamp: DateTime<Utc>,
    pub document_ref: Option<String>,
    pub concept: String,
    pub user: Option<String>,
}

impl MovementRecord {
    /// Units moved in the direction of this movement
    pub fn quantity(&self) -> u64 {
        match self.kind {
            MovementKind::Entry => self.quantity_in,
            MovementKind::Exit => self.quantity_out,
        }
    }

    /// Stock change caused by this movement: positive for entries, negative for exits
    pub fn signed_quantity(&self) -> EngineResult<i64> {
        let quantity = i64::try_from(self.quantity())
            .map_err(|_| EngineError::QuantityOverflow("signing a movement quantity"))?;
        Ok(match self.kind {
            MovementKind::Entry => quantity,
            MovementKind::Exit => -quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(kind: MovementKind, quantity_in: i64, quantity_out: i64) -> MovementInput {
        MovementInput {
            product_id: Uuid::from_u128(1),
            lot_id: None,
            batch_code: None,
            expiration_date: None,
            kind,
            quantity_in,
            quantity_out,
            unit_cost: Decimal::new(250, 2),
            total_value: None,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()),
            document_ref: Some("INV-001".to_string()),
            concept: "Sale".to_string(),
            user: None,
        }
    }

    #[test]
    fn test_validate_derives_total_value() {
        let record = input(MovementKind::Entry, 10, 0).validate(0).unwrap();
        assert_eq!(record.total_value, Decimal::new(2500, 2));
        assert_eq!(record.signed_quantity().unwrap(), 10);
    }

    #[test]
    fn test_validate_keeps_supplied_total_value() {
        let mut row = input(MovementKind::Exit, 0, 4);
        row.total_value = Some(Decimal::from(9));
        let record = row.validate(0).unwrap();
        assert_eq!(record.total_value, Decimal::from(9));
        assert_eq!(record.signed_quantity().unwrap(), -4);
    }

    #[test]
    fn test_validate_rejects_missing_timestamp() {
        let mut row = input(MovementKind::Entry, 1, 0);
        row.timestamp = None;
        assert_eq!(row.validate(7), Err(EngineError::MissingTimestamp { index: 7 }));
    }

    #[test]
    fn test_validate_rejects_negative_quantities() {
        assert_eq!(
            input(MovementKind::Entry, -5, 0).validate(0),
            Err(EngineError::NegativeQuantity {
                field: "quantity_in",
                value: -5
            })
        );
        // Rejected even when the field is not the one the kind uses
        assert!(input(MovementKind::Entry, 5, -1).validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_value_overflow() {
        let mut row = input(MovementKind::Entry, i64::MAX, 0);
        row.unit_cost = Decimal::from(100_000_000_000i64);
        assert_eq!(
            row.validate(0),
            Err(EngineError::AmountOverflow("deriving a movement value"))
        );
    }

    #[test]
    fn test_exit_ignores_quantity_in() {
        let record = input(MovementKind::Exit, 99, 3).validate(0).unwrap();
        assert_eq!(record.quantity(), 3);
        assert_eq!(record.signed_quantity().unwrap(), -3);
    }

    #[test]
    fn test_deserialize_input_with_timestamp_expiration() {
        let json = r#"{
            "product_id": "00000000-0000-0000-0000-000000000001",
            "lot_id": null,
            "batch_code": "B-1",
            "expiration_date": "2025-03-01T00:00:00.000Z",
            "kind": "exit",
            "quantity_out": 12,
            "unit_cost": "1.50",
            "total_value": null,
            "timestamp": "2024-01-15T09:00:00Z",
            "document_ref": null,
            "user": "maria"
        }"#;
        let row: MovementInput = serde_json::from_str(json).unwrap();
        assert_eq!(row.expiration_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(row.quantity_in, 0);
        assert_eq!(row.concept, "");
        let record = row.validate(0).unwrap();
        assert_eq!(record.total_value, Decimal::new(1800, 2));
    }
}
