//! Cart service
//!
//! Per-user shopping cart and checkout into an order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    add_quantities, round_money, AuthUser, CartLine, NewOrder, OrderLine, OrderWithItems,
    OrganizationId, ProductId,
};
use crate::domain::ports::{
    CartRepository, OrderRepository, OrganizationRepository, ProductRepository,
};
use crate::error::{AppError, DomainError};

use super::document_number;

/// Cart contents with computed totals
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: i32,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: f64,
}

impl CartView {
    fn from_lines(lines: Vec<CartLine>) -> Self {
        let item_count = lines.iter().map(|l| l.item.quantity).sum();
        let subtotal = round_money(lines.iter().map(CartLine::line_total).sum());
        Self {
            lines: lines
                .into_iter()
                .map(|line| CartLineView {
                    line_total: line.line_total(),
                    line,
                })
                .collect(),
            item_count,
            subtotal,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: Option<String>,
}

/// Service for carts and checkout
pub struct CartService<CR, PR, OR, OrgR>
where
    CR: CartRepository,
    PR: ProductRepository,
    OR: OrderRepository,
    OrgR: OrganizationRepository,
{
    carts: Arc<CR>,
    products: Arc<PR>,
    orders: Arc<OR>,
    orgs: Arc<OrgR>,
}

impl<CR, PR, OR, OrgR> CartService<CR, PR, OR, OrgR>
where
    CR: CartRepository,
    PR: ProductRepository,
    OR: OrderRepository,
    OrgR: OrganizationRepository,
{
    pub fn new(carts: Arc<CR>, products: Arc<PR>, orders: Arc<OR>, orgs: Arc<OrgR>) -> Self {
        Self {
            carts,
            products,
            orders,
            orgs,
        }
    }

    pub async fn view(&self, auth: &AuthUser) -> Result<CartView, AppError> {
        let lines = self.carts.list(&auth.user_id).await?;
        Ok(CartView::from_lines(lines))
    }

    /// Add units of a product, incrementing an existing row
    pub async fn add(
        &self,
        auth: &AuthUser,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        if quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be positive".to_string(),
            ));
        }

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;

        let lines = self.carts.list(&auth.user_id).await?;
        if let Some(other) = lines
            .iter()
            .find(|l| l.product.organization_id != product.organization_id)
        {
            return Err(AppError::BadRequest(format!(
                "Cart already holds products from another store ('{}')",
                other.product.name
            )));
        }

        let in_cart = lines
            .iter()
            .find(|l| l.item.product_id == *product_id)
            .map_or(0, |l| l.item.quantity);
        product.ensure_stock(add_quantities(in_cart, quantity)?)?;

        self.carts.add(&auth.user_id, product_id, quantity).await?;
        tracing::debug!(user_id = %auth.user_id, product_id = %product_id, quantity, "Added to cart");
        self.view(auth).await
    }

    /// Set the quantity of a row; zero removes it
    pub async fn set_quantity(
        &self,
        auth: &AuthUser,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        if quantity < 0 {
            return Err(AppError::BadRequest(
                "quantity cannot be negative".to_string(),
            ));
        }
        if quantity > 0 {
            let product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;
            product.ensure_stock(quantity)?;
        }

        self.carts
            .set_quantity(&auth.user_id, product_id, quantity)
            .await?;
        self.view(auth).await
    }

    pub async fn remove(
        &self,
        auth: &AuthUser,
        product_id: &ProductId,
    ) -> Result<CartView, AppError> {
        self.carts.remove(&auth.user_id, product_id).await?;
        self.view(auth).await
    }

    pub async fn clear(&self, auth: &AuthUser) -> Result<(), AppError> {
        self.carts.clear(&auth.user_id).await?;
        Ok(())
    }

    /// Turn the cart into a pending order. Stock is checked and taken for
    /// every line at once; the cart is emptied only if the order is placed.
    pub async fn checkout(
        &self,
        auth: &AuthUser,
        request: &CheckoutRequest,
    ) -> Result<OrderWithItems, AppError> {
        let lines = self.carts.list(&auth.user_id).await?;
        let org_id = single_org(&lines)?;

        let org = self
            .orgs
            .find_by_id(&org_id)
            .await?
            .filter(|o| o.is_active)
            .ok_or_else(|| AppError::BadRequest("Store is not accepting orders".to_string()))?;

        let order = self
            .orders
            .place(&NewOrder {
                organization_id: org_id,
                user_id: auth.user_id,
                order_number: document_number("ORD"),
                shipping_address: request.shipping_address.clone(),
                lines: lines
                    .iter()
                    .map(|l| OrderLine {
                        product_id: l.item.product_id,
                        quantity: l.item.quantity,
                    })
                    .collect(),
                tax_percentage: org.gst_percentage,
            })
            .await?;

        tracing::info!(
            order_id = %order.order.id,
            user_id = %auth.user_id,
            org_id = %org_id,
            total = order.order.total_amount,
            "Order placed"
        );
        Ok(order)
    }
}

fn single_org(lines: &[CartLine]) -> Result<OrganizationId, AppError> {
    let first = lines
        .first()
        .ok_or_else(|| AppError::BadRequest("Cart is empty".to_string()))?;
    let org_id = first.product.organization_id;
    if lines.iter().any(|l| l.product.organization_id != org_id) {
        return Err(AppError::Domain(DomainError::Validation(
            "All cart products must come from the same store".to_string(),
        )));
    }
    Ok(org_id)
}
