//! Purchase and sale detail line models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::types::date_only;

/// One detail line of a purchase order or sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub batch_code: Option<String>,
    #[serde(default, deserialize_with = "date_only::deserialize_option")]
    pub expiration_date: Option<NaiveDate>,
    /// Quantity in base units
    pub quantity: u64,
    /// Price per base unit
    pub unit_price: Decimal,
    /// Absolute discount applied to the whole line
    #[serde(default)]
    pub discount: Decimal,
}

impl LineItem {
    pub fn new(product_id: Uuid, quantity: u64, unit_price: Decimal) -> Self {
        Self {
            product_id,
            lot_id: None,
            batch_code: None,
            expiration_date: None,
            quantity,
            unit_price,
            discount: Decimal::ZERO,
        }
    }

    /// Gross amount before discount
    pub fn gross(&self) -> EngineResult<Decimal> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(EngineError::AmountOverflow("pricing a line"))
    }

    /// Line amount after discount
    pub fn subtotal(&self) -> EngineResult<Decimal> {
        self.gross()?
            .checked_sub(self.discount)
            .ok_or(EngineError::AmountOverflow("discounting a line"))
    }
}
