//! Order service
//!
//! Customers see and cancel their own orders; managers move orders
//! through fulfilment.

use std::sync::Arc;

use crate::domain::entities::{
    AuthUser, Order, OrderId, OrderStatus, OrderWithItems, OrganizationId, Role,
};
use crate::domain::ports::OrderRepository;
use crate::error::{AppError, DomainError};

/// Service for orders
pub struct OrderService<OR>
where
    OR: OrderRepository,
{
    orders: Arc<OR>,
}

impl<OR> OrderService<OR>
where
    OR: OrderRepository,
{
    pub fn new(orders: Arc<OR>) -> Self {
        Self { orders }
    }

    pub async fn list_mine(&self, auth: &AuthUser) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.list_by_user(&auth.user_id).await?)
    }

    /// The buyer, or a manager of the selling organization
    pub async fn get(&self, auth: &AuthUser, id: &OrderId) -> Result<OrderWithItems, AppError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {}", id)))?;

        let is_buyer = order.order.user_id == auth.user_id;
        let is_seller = auth.role.at_least(Role::Manager)
            && auth.ensure_org(order.order.organization_id).is_ok();
        if !is_buyer && !is_seller {
            // Hide the existence of other people's orders
            return Err(AppError::NotFound(format!("Order {}", id)));
        }
        Ok(order)
    }

    /// Cancel one of the caller's own orders while it is still pending
    pub async fn cancel_mine(&self, auth: &AuthUser, id: &OrderId) -> Result<Order, AppError> {
        let order = self.get(auth, id).await?;
        if order.order.user_id != auth.user_id {
            return Err(AppError::NotFound(format!("Order {}", id)));
        }
        if order.order.status != OrderStatus::Pending {
            return Err(AppError::Domain(DomainError::Validation(format!(
                "Only pending orders can be cancelled; order is {}",
                order.order.status
            ))));
        }

        let cancelled = self.orders.transition(id, OrderStatus::Cancelled).await?;
        tracing::info!(order_id = %id, user_id = %auth.user_id, "Order cancelled by customer");
        Ok(cancelled)
    }

    pub async fn list_org(
        &self,
        auth: &AuthUser,
        org: Option<OrganizationId>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AppError> {
        auth.require(Role::Manager)?;
        let org_id = auth.scope_org(org)?;
        Ok(self.orders.list_by_org(&org_id, status).await?)
    }

    pub async fn update_status(
        &self,
        auth: &AuthUser,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        auth.require(Role::Manager)?;
        let order = self.get(auth, id).await?;
        auth.ensure_org(order.order.organization_id)?;

        let updated = self.orders.transition(id, status).await?;
        tracing::info!(
            order_id = %id,
            org_id = %updated.organization_id,
            from = %order.order.status,
            to = %updated.status,
            "Order status changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewOrder, OrderLine};
    use crate::test_utils::{
        auth_for, test_org, test_product, test_user, InMemoryCartRepository,
        InMemoryOrderRepository, InMemoryProductRepository,
    };

    struct Fixture {
        service: OrderService<InMemoryOrderRepository>,
        orders: Arc<InMemoryOrderRepository>,
        products: InMemoryProductRepository,
    }

    fn create_service(products: InMemoryProductRepository) -> Fixture {
        let carts = InMemoryCartRepository::new(products.table());
        let orders = Arc::new(InMemoryOrderRepository::new(products.table(), carts.rows()));
        Fixture {
            service: OrderService::new(orders.clone()),
            orders,
            products,
        }
    }

    async fn place(
        fx: &Fixture,
        buyer: &AuthUser,
        org: OrganizationId,
        lines: Vec<OrderLine>,
    ) -> Order {
        fx.orders
            .place(&NewOrder {
                organization_id: org,
                user_id: buyer.user_id,
                order_number: "ORD-20240501-ABCDEF".to_string(),
                shipping_address: None,
                lines,
                tax_percentage: None,
            })
            .await
            .unwrap()
            .order
    }

    #[tokio::test]
    async fn customer_cancels_pending_order_and_stock_returns() {
        let org = test_org();
        let rice = test_product(org.id, "Rice", 80.0, 10);
        let fx = create_service(InMemoryProductRepository::new().with_product(rice.clone()));
        let buyer = auth_for(&test_user(Role::Customer, Some(org.id)));
        let order = place(
            &fx,
            &buyer,
            org.id,
            vec![OrderLine {
                product_id: rice.id,
                quantity: 4,
            }],
        )
        .await;
        assert_eq!(fx.products.stock_of(&rice.id), Some(6));

        let cancelled = fx.service.cancel_mine(&buyer, &order.id).await.unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(fx.products.stock_of(&rice.id), Some(10));
    }

    #[tokio::test]
    async fn customer_cannot_cancel_confirmed_order() {
        let org = test_org();
        let rice = test_product(org.id, "Rice", 80.0, 10);
        let fx = create_service(InMemoryProductRepository::new().with_product(rice.clone()));
        let buyer = auth_for(&test_user(Role::Customer, Some(org.id)));
        let manager = auth_for(&test_user(Role::Manager, Some(org.id)));
        let order = place(
            &fx,
            &buyer,
            org.id,
            vec![OrderLine {
                product_id: rice.id,
                quantity: 1,
            }],
        )
        .await;

        fx.service
            .update_status(&manager, &order.id, OrderStatus::Confirmed)
            .await
            .unwrap();

        assert!(matches!(
            fx.service.cancel_mine(&buyer, &order.id).await,
            Err(AppError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn invalid_transition_is_rejected() {
        let org = test_org();
        let rice = test_product(org.id, "Rice", 80.0, 10);
        let fx = create_service(InMemoryProductRepository::new().with_product(rice.clone()));
        let buyer = auth_for(&test_user(Role::Customer, Some(org.id)));
        let manager = auth_for(&test_user(Role::Manager, Some(org.id)));
        let order = place(
            &fx,
            &buyer,
            org.id,
            vec![OrderLine {
                product_id: rice.id,
                quantity: 1,
            }],
        )
        .await;

        let result = fx
            .service
            .update_status(&manager, &order.id, OrderStatus::Delivered)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn other_customers_cannot_see_order() {
        let org = test_org();
        let rice = test_product(org.id, "Rice", 80.0, 10);
        let fx = create_service(InMemoryProductRepository::new().with_product(rice.clone()));
        let buyer = auth_for(&test_user(Role::Customer, Some(org.id)));
        let nosy = auth_for(&test_user(Role::Customer, Some(org.id)));
        let outside_manager = auth_for(&test_user(Role::Manager, Some(OrganizationId::new())));
        let order = place(
            &fx,
            &buyer,
            org.id,
            vec![OrderLine {
                product_id: rice.id,
                quantity: 1,
            }],
        )
        .await;

        assert!(fx.service.get(&buyer, &order.id).await.is_ok());
        assert!(matches!(
            fx.service.get(&nosy, &order.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(fx.service.get(&outside_manager, &order.id).await.is_err());
    }

    #[tokio::test]
    async fn manager_lists_org_orders_by_status() {
        let org = test_org();
        let rice = test_product(org.id, "Rice", 80.0, 10);
        let fx = create_service(InMemoryProductRepository::new().with_product(rice.clone()));
        let buyer = auth_for(&test_user(Role::Customer, Some(org.id)));
        let manager = auth_for(&test_user(Role::Manager, Some(org.id)));
        let line = vec![OrderLine {
            product_id: rice.id,
            quantity: 1,
        }];
        let first = place(&fx, &buyer, org.id, line.clone()).await;
        place(&fx, &buyer, org.id, line).await;
        fx.service
            .update_status(&manager, &first.id, OrderStatus::Confirmed)
            .await
            .unwrap();

        let pending = fx
            .service
            .list_org(&manager, None, Some(OrderStatus::Pending))
            .await
            .unwrap();
        let all = fx.service.list_org(&manager, None, None).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(all.len(), 2);
        assert!(fx.service.list_org(&buyer, None, None).await.is_err());
    }
}
