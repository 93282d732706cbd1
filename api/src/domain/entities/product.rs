//! Product domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::organization::OrganizationId;
use crate::error::DomainError;

uuid_id!(
    /// Unique identifier for a product
    ProductId
);

/// A catalog product with its on-hand stock
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Check that `quantity` units can be taken from stock
    pub fn ensure_stock(&self, quantity: i32) -> Result<(), DomainError> {
        if !self.is_active {
            return Err(DomainError::Validation(format!(
                "Product '{}' is not available",
                self.name
            )));
        }
        if self.stock_quantity < quantity {
            return Err(DomainError::Validation(format!(
                "Insufficient stock for '{}': available {}, requested {}",
                self.name, self.stock_quantity, quantity
            )));
        }
        Ok(())
    }
}

/// Sum two unit counts, rejecting totals an `i32` column cannot hold
pub fn add_quantities(current: i32, extra: i32) -> Result<i32, DomainError> {
    current.checked_add(extra).ok_or_else(|| {
        DomainError::Validation(format!("Quantity {} + {} is too large", current, extra))
    })
}

/// Bounds the current stock level must lie within for `delta` to keep it
/// in `0..=i32::MAX`
pub fn stock_bounds(delta: i32) -> Result<(i32, i32), DomainError> {
    let floor = delta.checked_neg().ok_or_else(|| {
        DomainError::Validation(format!("Stock change {} is out of range", delta))
    })?;
    let ceiling = if delta > 0 { i32::MAX - delta } else { i32::MAX };
    Ok((floor.max(0), ceiling))
}

/// Data needed to create a new product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub organization_id: OrganizationId,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    pub stock_quantity: i32,
}

/// Partial update of a product
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

/// Filters for catalog listings
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    pub include_inactive: bool,
    /// Zero means no limit
    pub limit: u64,
    pub offset: u64,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }
        if let Some(category) = &self.category {
            if product.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}
