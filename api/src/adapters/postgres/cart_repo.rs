//! PostgreSQL adapter for CartRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::entities::{add_quantities, CartItem, CartLine, Product, ProductId, UserId};
use crate::domain::ports::CartRepository;
use crate::entity::{cart_items, products};
use crate::error::DomainError;

/// PostgreSQL implementation of CartRepository
pub struct PostgresCartRepository {
    db: DatabaseConnection,
}

impl PostgresCartRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_row(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<cart_items::Model>, DomainError> {
        cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user_id.0))
            .filter(cart_items::Column::ProductId.eq(product_id.0))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn list(&self, user_id: &UserId) -> Result<Vec<CartLine>, DomainError> {
        let rows = cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user_id.0))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
        let mut catalog: HashMap<Uuid, Product> = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        // Rows whose product has been deleted are dropped from the view
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let product = catalog.remove(&row.product_id)?;
                Some(CartLine {
                    item: row.into(),
                    product,
                })
            })
            .collect())
    }

    async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<(), DomainError> {
        match self.find_row(user_id, product_id).await? {
            Some(existing) => {
                let total = add_quantities(existing.quantity, quantity)?;
                let mut model: cart_items::ActiveModel = existing.into();
                model.quantity = Set(total);
                model
                    .update(&self.db)
                    .await
                    .map_err(|e| DomainError::Database(e.to_string()))?;
            }
            None => {
                cart_items::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id.0),
                    product_id: Set(product_id.0),
                    quantity: Set(quantity),
                    created_at: Set(Utc::now().fixed_offset()),
                }
                .insert(&self.db)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<(), DomainError> {
        if quantity <= 0 {
            return self.remove(user_id, product_id).await;
        }

        let existing = self.find_row(user_id, product_id).await?.ok_or_else(|| {
            DomainError::NotFound(format!("Product {} is not in the cart", product_id))
        })?;

        let mut model: cart_items::ActiveModel = existing.into();
        model.quantity = Set(quantity);
        model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, user_id: &UserId, product_id: &ProductId) -> Result<(), DomainError> {
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::UserId.eq(user_id.0))
            .filter(cart_items::Column::ProductId.eq(product_id.0))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!(
                "Product {} is not in the cart",
                product_id
            )));
        }

        Ok(())
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), DomainError> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::UserId.eq(user_id.0))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        CartItem {
            id: model.id,
            user_id: UserId(model.user_id),
            product_id: ProductId(model.product_id),
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
