//! PostgreSQL adapter for OrderRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{
    BillAdjustments, BillTotals, NewOrder, Order, OrderId, OrderItem, OrderStatus, OrderWithItems,
    OrganizationId, ProductId, UserId,
};
use crate::domain::ports::OrderRepository;
use crate::entity::{cart_items, order_items, orders};
use crate::error::DomainError;

use super::finish;
use super::stock::{release_stock, reserve_stock};

/// PostgreSQL implementation of OrderRepository
pub struct PostgresOrderRepository {
    db: DatabaseConnection,
}

impl PostgresOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn items_of<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<OrderItem>, DomainError> {
    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::ProductName)
        .all(conn)
        .await?;

    Ok(items.into_iter().map(|m| m.into()).collect())
}

async fn place_in<C: ConnectionTrait>(
    conn: &C,
    order: &NewOrder,
) -> Result<OrderWithItems, DomainError> {
    let lines: Vec<_> = order
        .lines
        .iter()
        .map(|l| (l.product_id, l.quantity))
        .collect();
    let priced = reserve_stock(conn, &order.organization_id, &lines).await?;

    let adjustments = BillAdjustments {
        tax_percentage: order.tax_percentage,
        ..Default::default()
    };
    let totals = BillTotals::compute(&priced, &adjustments, None)?;

    let now = Utc::now().fixed_offset();
    let order_id = Uuid::new_v4();
    let model = orders::ActiveModel {
        id: Set(order_id),
        organization_id: Set(order.organization_id.0),
        user_id: Set(order.user_id.0),
        order_number: Set(order.order_number.clone()),
        status: Set(OrderStatus::Pending.to_string()),
        subtotal: Set(totals.subtotal),
        tax_amount: Set(totals.tax_amount),
        total_amount: Set(totals.total_amount),
        shipping_address: Set(order.shipping_address.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for line in &priced {
        let item = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id.0),
            product_name: Set(line.product_name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total()),
        }
        .insert(conn)
        .await?;
        items.push(item.into());
    }

    // Only the purchased products leave the cart
    let purchased: Vec<Uuid> = priced.iter().map(|l| l.product_id.0).collect();
    cart_items::Entity::delete_many()
        .filter(cart_items::Column::UserId.eq(order.user_id.0))
        .filter(cart_items::Column::ProductId.is_in(purchased))
        .exec(conn)
        .await?;

    Ok(OrderWithItems {
        order: model.into(),
        items,
    })
}

async fn transition_in<C: ConnectionTrait>(
    conn: &C,
    id: &OrderId,
    status: OrderStatus,
) -> Result<Order, DomainError> {
    let current = orders::Entity::find_by_id(id.0)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))?;

    let from: OrderStatus = current
        .status
        .parse()
        .map_err(DomainError::Internal)?;
    if !from.can_transition_to(status) {
        return Err(DomainError::Validation(format!(
            "Order {} cannot move from {} to {}",
            current.order_number, from, status
        )));
    }

    if status == OrderStatus::Cancelled {
        let restock: Vec<(ProductId, i32)> = items_of(conn, id.0)
            .await?
            .into_iter()
            .map(|item| (item.product_id, item.quantity))
            .collect();
        release_stock(conn, &restock).await?;
    }

    let mut model: orders::ActiveModel = current.into();
    model.status = Set(status.to_string());
    model.updated_at = Set(Utc::now().fixed_offset());
    let updated = model.update(conn).await?;

    Ok(updated.into())
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn place(&self, order: &NewOrder) -> Result<OrderWithItems, DomainError> {
        let txn = self.db.begin().await?;
        let result = place_in(&txn, order).await;
        finish(txn, result).await
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<OrderWithItems>, DomainError> {
        let Some(order) = orders::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let items = items_of(&self.db, order.id).await?;
        Ok(Some(OrderWithItems {
            order: order.into(),
            items,
        }))
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let results = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id.0))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn list_by_org(
        &self,
        org_id: &OrganizationId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut query = orders::Entity::find().filter(orders::Column::OrganizationId.eq(org_id.0));
        if let Some(status) = status {
            query = query.filter(orders::Column::Status.eq(status.to_string()));
        }

        let results = query
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn transition(&self, id: &OrderId, status: OrderStatus) -> Result<Order, DomainError> {
        let txn = self.db.begin().await?;
        let result = transition_in(&txn, id, status).await;
        finish(txn, result).await
    }
}

/// Convert SeaORM model to domain entity
impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Order {
            id: OrderId(model.id),
            organization_id: OrganizationId(model.organization_id),
            user_id: UserId(model.user_id),
            order_number: model.order_number,
            status: model.status.parse().unwrap_or(OrderStatus::Pending),
            subtotal: model.subtotal,
            tax_amount: model.tax_amount,
            total_amount: model.total_amount,
            shipping_address: model.shipping_address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: OrderId(model.order_id),
            product_id: ProductId(model.product_id),
            product_name: model.product_name,
            unit_price: model.unit_price,
            quantity: model.quantity,
            line_total: model.line_total,
        }
    }
}
