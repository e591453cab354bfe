//! Product catalog models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::packaging::PackagingUnits;

/// A sellable product as supplied by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Base units per package; 1 means the product is not packaged
    #[serde(default = "default_packaging_size")]
    pub packaging_size: u32,
    /// Package noun, e.g. "Box" or "Blister"
    #[serde(default = "default_packaging_name")]
    pub packaging_name: String,
    #[serde(default = "default_base_unit_name")]
    pub base_unit_name: String,
}

fn default_packaging_size() -> u32 {
    1
}

fn default_packaging_name() -> String {
    "Box".to_string()
}

fn default_base_unit_name() -> String {
    "Unit".to_string()
}

impl Product {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            packaging_size: default_packaging_size(),
            packaging_name: default_packaging_name(),
            base_unit_name: default_base_unit_name(),
        }
    }

    pub fn with_packaging(mut self, size: u32, packaging_name: impl Into<String>) -> Self {
        self.packaging_size = size;
        self.packaging_name = packaging_name.into();
        self
    }

    pub fn with_base_unit(mut self, base_unit_name: impl Into<String>) -> Self {
        self.base_unit_name = base_unit_name.into();
        self
    }

    /// Whether quantities of this product split into packages
    pub fn is_packaged(&self) -> bool {
        self.packaging_size > 1
    }

    /// Packaging view used for quantity conversion and display
    pub fn units(&self) -> PackagingUnits {
        PackagingUnits::new(
            self.packaging_size,
            self.packaging_name.clone(),
            self.base_unit_name.clone(),
        )
    }
}

/// Display attributes of a product carried alongside grouped results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub packaging_size: u32,
    pub packaging_name: String,
    pub base_unit_name: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            packaging_size: product.packaging_size,
            packaging_name: product.packaging_name.clone(),
            base_unit_name: product.base_unit_name.clone(),
        }
    }
}
