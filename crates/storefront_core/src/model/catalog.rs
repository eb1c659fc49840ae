//! Catalog records: categories and products.
//!
//! # Invariants
//! - `category_name` and product `name` are non-blank.
//! - `price >= 0` and `stock_quantity >= 0`.
//! - Ids are surrogate keys assigned by SQLite on insert.

use super::{require_non_negative, require_text, ModelValidationError, Money};
use serde::{Deserialize, Serialize};

/// Surrogate key of a `category` row.
pub type CategoryId = i64;

/// Surrogate key of a `product` row.
pub type ProductId = i64;

/// Persisted product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
}

/// Persisted product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor units.
    pub price: Money,
    pub stock_quantity: i64,
    /// Seller label shown alongside the listing.
    pub sold_by: String,
}

impl Product {
    /// Validates the persisted shape against schema checks.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("name", &self.name)?;
        require_text("sold_by", &self.sold_by)?;
        require_non_negative("price", self.price)?;
        require_non_negative("stock_quantity", self.stock_quantity)?;
        Ok(())
    }
}

/// Insert payload for a new product; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: i64,
    pub sold_by: String,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("name", &self.name)?;
        require_text("sold_by", &self.sold_by)?;
        require_non_negative("price", self.price)?;
        require_non_negative("stock_quantity", self.stock_quantity)?;
        Ok(())
    }

    /// Attaches the assigned surrogate key.
    pub fn into_product(self, product_id: ProductId) -> Product {
        Product {
            product_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            sold_by: self.sold_by,
        }
    }
}

/// Validates a category name before insert.
pub fn validate_category_name(name: &str) -> Result<(), ModelValidationError> {
    require_text("category_name", name)
}
