//! Loading exported inventory records from disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

use shared::sources::InMemoryStore;
use shared::{LineItem, Lot, MovementInput, Product};

use crate::error::CliError;

const PRODUCTS_FILE: &str = "products.json";
const LOTS_FILE: &str = "lots.json";
const MOVEMENTS_FILE: &str = "movements.json";

/// Directory of JSON exports produced by the backend
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        read_json(&self.root.join(name))
    }

    pub fn products(&self) -> anyhow::Result<Vec<Product>> {
        self.read(PRODUCTS_FILE)
    }

    pub fn lots(&self) -> anyhow::Result<Vec<Lot>> {
        self.read(LOTS_FILE)
    }

    pub fn movements(&self) -> anyhow::Result<Vec<MovementInput>> {
        self.read(MOVEMENTS_FILE)
    }

    /// Store holding the catalog and movement history
    pub fn movement_store(&self) -> anyhow::Result<InMemoryStore> {
        Ok(InMemoryStore::new()
            .with_products(self.products()?)
            .with_movements(self.movements()?))
    }

    /// Store holding the catalog and lots
    pub fn lot_store(&self) -> anyhow::Result<InMemoryStore> {
        Ok(InMemoryStore::new()
            .with_products(self.products()?)
            .with_lots(self.lots()?))
    }
}

/// Read a purchase or sale detail export
pub fn read_lines(path: &Path) -> anyhow::Result<Vec<LineItem>> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        return Err(CliError::MissingDataFile(path.to_path_buf()).into());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded export");
    Ok(parsed)
}
