//! Inventory accounting engine for the pharmacy inventory manager
//!
//! Turns already-fetched movement, lot and product records into:
//! - a Kardex (running-balance ledger) per product
//! - expiration risk buckets of lots, grouped by product
//! - packaged quantity breakdowns ("3 Boxes (36) and 3 Units")
//! - per-product totals of purchase and sale lines
//!
//! The engine is synchronous and performs no I/O. "Today" is always
//! supplied by the caller through a [`sources::Clock`].

pub mod error;
pub mod expiration;
pub mod grouping;
pub mod ledger;
pub mod line_items;
pub mod models;
pub mod packaging;
pub mod sources;
pub mod types;

pub use error::*;
pub use models::*;
pub use types::*;
