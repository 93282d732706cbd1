//! PostgreSQL adapter for ProductRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    stock_bounds, NewProduct, OrganizationId, Product, ProductFilter, ProductId, ProductUpdate,
};
use crate::domain::ports::ProductRepository;
use crate::entity::products;
use crate::error::DomainError;

use super::update_error;

/// PostgreSQL implementation of ProductRepository
pub struct PostgresProductRepository {
    db: DatabaseConnection,
}

impl PostgresProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let result = products::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(
        &self,
        org_id: &OrganizationId,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, DomainError> {
        let mut query =
            products::Entity::find().filter(products::Column::OrganizationId.eq(org_id.0));
        if !filter.include_inactive {
            query = query.filter(products::Column::IsActive.eq(true));
        }
        if let Some(category) = &filter.category {
            query = query.filter(products::Column::Category.eq(category.as_str()));
        }
        if let Some(search) = &filter.search {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(products::Column::Name)))
                    .like(format!("%{}%", search.to_lowercase())),
            );
        }
        query = query.order_by_asc(products::Column::Name).offset(filter.offset);
        if filter.limit > 0 {
            query = query.limit(filter.limit);
        }

        let results = query
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(product.organization_id.0),
            name: Set(product.name.clone()),
            sku: Set(product.sku.clone()),
            description: Set(product.description.clone()),
            category: Set(product.category.clone()),
            price: Set(product.price),
            stock_quantity: Set(product.stock_quantity),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, DomainError> {
        let mut model = products::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        if let Some(name) = &update.name {
            model.name = Set(name.clone());
        }
        if let Some(sku) = &update.sku {
            model.sku = Set(Some(sku.clone()));
        }
        if let Some(description) = &update.description {
            model.description = Set(Some(description.clone()));
        }
        if let Some(category) = &update.category {
            model.category = Set(Some(category.clone()));
        }
        if let Some(price) = update.price {
            model.price = Set(price);
        }
        if let Some(active) = update.is_active {
            model.is_active = Set(active);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| update_error(e, format!("Product {}", id)))?;

        Ok(result.into())
    }

    async fn adjust_stock(&self, id: &ProductId, delta: i32) -> Result<Product, DomainError> {
        // Guarded update: the row only changes if the result stays in range
        let (floor, ceiling) = stock_bounds(delta)?;
        let result = products::Entity::update_many()
            .col_expr(
                products::Column::StockQuantity,
                Expr::col(products::Column::StockQuantity).add(delta),
            )
            .col_expr(
                products::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(products::Column::Id.eq(id.0))
            .filter(products::Column::StockQuantity.gte(floor))
            .filter(products::Column::StockQuantity.lte(ceiling))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;

        if result.rows_affected == 0 {
            return Err(DomainError::Validation(format!(
                "Stock for '{}' must stay between 0 and {} (current {}, change {})",
                product.name,
                i32::MAX,
                product.stock_quantity,
                delta
            )));
        }

        Ok(product)
    }
}

/// Convert SeaORM model to domain entity
impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: ProductId(model.id),
            organization_id: OrganizationId(model.organization_id),
            name: model.name,
            sku: model.sku,
            description: model.description,
            category: model.category,
            price: model.price,
            stock_quantity: model.stock_quantity,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
