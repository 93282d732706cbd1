//! Product handlers
//!
//! The public storefront listing plus staff catalog management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::CreateProduct;
use crate::domain::entities::{
    AuthUser, OrganizationId, Product, ProductFilter, ProductId, ProductUpdate,
};
use crate::error::AppError;
use crate::AppState;

const MAX_PAGE_SIZE: u64 = 200;

/// Query parameters for product listings
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Only honoured for super admins on the staff listing
    pub organization_id: Option<OrganizationId>,
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone().filter(|c| !c.is_empty()),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            include_inactive: self.include_inactive,
            limit: self.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE),
            offset: self.offset,
        }
    }
}

/// Request body for a stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// Units to add; negative to remove
    pub delta: i32,
}

/// GET /storefront/:org_id/products
///
/// Public listing of active products. No authentication.
pub async fn storefront_products(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .catalog_service
        .storefront(&OrganizationId(org_id), query.filter())
        .await?;
    Ok(Json(products))
}

/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .catalog_service
        .list(&auth, query.organization_id, &query.filter())
        .await?;
    Ok(Json(products))
}

/// GET /products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.catalog_service.get(&auth, &ProductId(id)).await?))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.catalog_service.create(&auth, &request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .catalog_service
        .update(&auth, &ProductId(id), &update)
        .await?;
    Ok(Json(product))
}

/// POST /products/:id/stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .catalog_service
        .adjust_stock(&auth, &ProductId(id), request.delta)
        .await?;
    Ok(Json(product))
}

/// DELETE /products/:id
///
/// Soft delete: the product stays for order history but leaves the storefront.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(
        state.catalog_service.delete(&auth, &ProductId(id)).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_to_first_page_of_fifty() {
        let filter = ProductQuery::default().filter();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert!(!filter.include_inactive);
    }

    #[test]
    fn query_clamps_page_size() {
        let query = ProductQuery {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(query.filter().limit, MAX_PAGE_SIZE);

        let query = ProductQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(query.filter().limit, 1);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ProductQuery {
            search: Some("   ".to_string()),
            category: Some(String::new()),
            ..Default::default()
        };
        let filter = query.filter();
        assert!(filter.search.is_none());
        assert!(filter.category.is_none());
    }

    #[test]
    fn parse_create_product_request() {
        let json = r#"{"name": "Curd 1kg", "price": 60.5, "category": "dairy"}"#;
        let request: CreateProduct = serde_json::from_str(json).unwrap();
        assert_eq!(request.price, 60.5);
        assert_eq!(request.stock_quantity, 0);
    }

    #[test]
    fn parse_adjust_stock_request() {
        let request: AdjustStockRequest = serde_json::from_str(r#"{"delta": -4}"#).unwrap();
        assert_eq!(request.delta, -4);
    }
}
