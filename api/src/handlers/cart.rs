//! Cart handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::{CartView, CheckoutRequest};
use crate::domain::entities::{AuthUser, OrderWithItems, ProductId};
use crate::error::AppError;
use crate::AppState;

/// Request body for adding to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Request body for setting a cart row's quantity
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

/// GET /cart
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(state.cart_service.view(&auth).await?))
}

/// POST /cart/items
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>, AppError> {
    let cart = state
        .cart_service
        .add(&auth, &request.product_id, request.quantity)
        .await?;
    Ok(Json(cart))
}

/// PUT /cart/items/:product_id
pub async fn set_cart_quantity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let cart = state
        .cart_service
        .set_quantity(&auth, &ProductId(product_id), request.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /cart/items/:product_id
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartView>, AppError> {
    let cart = state
        .cart_service
        .remove(&auth, &ProductId(product_id))
        .await?;
    Ok(Json(cart))
}

/// DELETE /cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    state.cart_service.clear(&auth).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cart/checkout
///
/// Places an order for everything in the cart.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Option<Json<CheckoutRequest>>,
) -> Result<(StatusCode, Json<OrderWithItems>), AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let order = state.cart_service.checkout(&auth, &request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
