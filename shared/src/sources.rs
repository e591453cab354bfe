//! Collaborators the engine reads from
//!
//! Fetching is done by the host before the engine runs; these traits only
//! describe the already-retrieved data the engine consumes.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Lot, MovementInput, Product};
use crate::types::DateRange;

/// Source of the reference date ("today")
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Business-local calendar date from the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Supplies the movement history of a product
pub trait MovementSource {
    fn movements_for(&self, product_id: Uuid) -> Vec<MovementInput>;
}

/// Supplies lots, optionally narrowed to an expiration window
pub trait LotSource {
    fn lots(&self, window: Option<DateRange>) -> Vec<Lot>;
}

/// Supplies product catalog metadata
pub trait ProductSource {
    fn product(&self, id: Uuid) -> Option<&Product>;
}

impl ProductSource for HashMap<Uuid, Product> {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.get(&id)
    }
}

impl ProductSource for [Product] {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.iter().find(|product| product.id == id)
    }
}

impl ProductSource for Vec<Product> {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.as_slice().product(id)
    }
}

/// Records already loaded into memory, e.g. from exported JSON files
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    products: HashMap<Uuid, Product>,
    lots: Vec<Lot>,
    movements: Vec<MovementInput>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: impl IntoIterator<Item = Product>) -> Self {
        self.products
            .extend(products.into_iter().map(|product| (product.id, product)));
        self
    }

    pub fn with_lots(mut self, lots: impl IntoIterator<Item = Lot>) -> Self {
        self.lots.extend(lots);
        self
    }

    pub fn with_movements(mut self, movements: impl IntoIterator<Item = MovementInput>) -> Self {
        self.movements.extend(movements);
        self
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

impl MovementSource for InMemoryStore {
    fn movements_for(&self, product_id: Uuid) -> Vec<MovementInput> {
        self.movements
            .iter()
            .filter(|movement| movement.product_id == product_id)
            .cloned()
            .collect()
    }
}

impl LotSource for InMemoryStore {
    fn lots(&self, window: Option<DateRange>) -> Vec<Lot> {
        self.lots
            .iter()
            .filter(|lot| window.map_or(true, |range| range.contains(lot.expiration_date)))
            .cloned()
            .collect()
    }
}

impl ProductSource for InMemoryStore {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.get(&id)
    }
}
