//! Error types for the inventory accounting engine
//!
//! Every failure is local to a single call and recoverable by the caller.
//! The engine never substitutes a default for bad input.

use thiserror::Error;
use uuid::Uuid;

/// Engine error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // Invalid input data
    #[error("Movement at position {index} has no timestamp")]
    MissingTimestamp { index: usize },

    #[error("Negative quantity in {field}: {value}")]
    NegativeQuantity { field: &'static str, value: i64 },

    #[error("Movement at position {index} belongs to product {found}, expected {expected}")]
    ForeignMovement {
        index: usize,
        expected: Uuid,
        found: Uuid,
    },

    #[error("Product not found: {0}")]
    UnknownProduct(Uuid),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // Arithmetic
    #[error("Quantity overflow while {0}")]
    QuantityOverflow(&'static str),

    #[error("Amount overflow while {0}")]
    AmountOverflow(&'static str),

    // Degenerate configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
