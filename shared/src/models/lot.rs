//! Lot (batch) models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::types::date_only;

/// A physical batch of a product, tracked because it expires
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lot {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Supplier batch code printed on the package
    pub batch_code: String,
    #[serde(deserialize_with = "date_only::deserialize")]
    pub expiration_date: NaiveDate,
    /// Units left in this lot, in base units
    pub remaining_stock: i64,
    #[serde(default)]
    pub status: LotStatus,
}

impl Lot {
    /// Whether the lot still holds units; negative stock is corrupt input
    pub fn has_stock(&self) -> EngineResult<bool> {
        if self.remaining_stock < 0 {
            return Err(EngineError::NegativeQuantity {
                field: "remaining_stock",
                value: self.remaining_stock,
            });
        }
        Ok(self.remaining_stock > 0)
    }
}

/// Lifecycle status of a lot, set by business actions outside the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    #[default]
    Active,
    Withdrawn,
    Expired,
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LotStatus::Active => write!(f, "Active"),
            LotStatus::Withdrawn => write!(f, "Withdrawn"),
            LotStatus::Expired => write!(f, "Expired"),
        }
    }
}
