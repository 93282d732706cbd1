//! Shopping cart entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::money::round_money;
use super::product::{Product, ProductId};
use super::user::UserId;

/// A stored cart row
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A cart row joined with its product
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        round_money(self.product.price * self.item.quantity as f64)
    }
}
