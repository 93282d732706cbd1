//! Catalog service
//!
//! Public storefront listing plus staff management of products and stock.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entities::{
    AuthUser, NewProduct, OrganizationId, Product, ProductFilter, ProductId, ProductUpdate, Role,
};
use crate::domain::ports::ProductRepository;
use crate::error::AppError;

/// Request to create a product
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    /// Only honoured for super admins
    pub organization_id: Option<OrganizationId>,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i32,
}

/// Service for the product catalog
pub struct CatalogService<PR>
where
    PR: ProductRepository,
{
    products: Arc<PR>,
}

impl<PR> CatalogService<PR>
where
    PR: ProductRepository,
{
    pub fn new(products: Arc<PR>) -> Self {
        Self { products }
    }

    /// Active products of an organization, visible without authentication
    pub async fn storefront(
        &self,
        org_id: &OrganizationId,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, AppError> {
        let filter = ProductFilter {
            include_inactive: false,
            ..filter
        };
        Ok(self.products.list(org_id, &filter).await?)
    }

    /// Staff listing; may include inactive products
    pub async fn list(
        &self,
        auth: &AuthUser,
        org: Option<OrganizationId>,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, AppError> {
        auth.require(Role::Employee)?;
        let org_id = auth.scope_org(org)?;
        Ok(self.products.list(&org_id, filter).await?)
    }

    /// A single product. Customers only see active products.
    pub async fn get(&self, auth: &AuthUser, id: &ProductId) -> Result<Product, AppError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .filter(|p| auth.role.is_staff() || auth.is_super_admin() || p.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;

        if auth.role.at_least(Role::Employee) {
            auth.ensure_org(product.organization_id)?;
        }
        Ok(product)
    }

    pub async fn create(
        &self,
        auth: &AuthUser,
        request: &CreateProduct,
    ) -> Result<Product, AppError> {
        auth.require(Role::Manager)?;
        let org_id = auth.scope_org(request.organization_id)?;

        let mut errors = product_errors(Some(&request.name), Some(request.price));
        if request.stock_quantity < 0 {
            errors.push("stock_quantity cannot be negative".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let product = self
            .products
            .create(&NewProduct {
                organization_id: org_id,
                name: request.name.trim().to_string(),
                sku: request.sku.clone(),
                description: request.description.clone(),
                category: request.category.clone(),
                price: request.price,
                stock_quantity: request.stock_quantity,
            })
            .await?;

        tracing::info!(product_id = %product.id, org_id = %org_id, "Product created");
        Ok(product)
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, AppError> {
        auth.require(Role::Manager)?;
        self.owned(auth, id).await?;

        let errors = product_errors(update.name.as_deref(), update.price);
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let product = self.products.update(id, update).await?;
        tracing::info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Add `delta` (possibly negative) to the stock level
    pub async fn adjust_stock(
        &self,
        auth: &AuthUser,
        id: &ProductId,
        delta: i32,
    ) -> Result<Product, AppError> {
        auth.require(Role::Manager)?;
        self.owned(auth, id).await?;

        let product = self.products.adjust_stock(id, delta).await?;
        tracing::info!(
            product_id = %product.id,
            delta,
            stock = product.stock_quantity,
            "Stock adjusted"
        );
        Ok(product)
    }

    /// Soft delete: the product is hidden from the storefront
    pub async fn delete(&self, auth: &AuthUser, id: &ProductId) -> Result<Product, AppError> {
        auth.require(Role::Manager)?;
        self.owned(auth, id).await?;

        let product = self
            .products
            .update(
                id,
                &ProductUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(product_id = %product.id, "Product deactivated");
        Ok(product)
    }

    /// Load a product the caller's organization owns
    async fn owned(&self, auth: &AuthUser, id: &ProductId) -> Result<Product, AppError> {
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", id)))?;
        auth.ensure_org(product.organization_id)?;
        Ok(product)
    }
}

fn product_errors(name: Option<&str>, price: Option<f64>) -> Vec<String> {
    let mut errors = Vec::new();
    if matches!(name, Some(n) if n.trim().is_empty()) {
        errors.push("name cannot be empty".to_string());
    }
    if matches!(price, Some(p) if p < 0.0 || !p.is_finite()) {
        errors.push("price must be a non-negative number".to_string());
    }
    errors
}
