//! Order handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::{
    AuthUser, Order, OrderId, OrderStatus, OrderWithItems, OrganizationId,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for the organization order listing
#[derive(Debug, Default, Deserialize)]
pub struct OrgOrdersQuery {
    /// Only honoured for super admins
    pub organization_id: Option<OrganizationId>,
    pub status: Option<OrderStatus>,
}

/// Request body for a status change
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// GET /orders
///
/// The caller's own orders, newest first.
pub async fn list_my_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.order_service.list_mine(&auth).await?))
}

/// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithItems>, AppError> {
    Ok(Json(state.order_service.get(&auth, &OrderId(id)).await?))
}

/// POST /orders/:id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state.order_service.cancel_mine(&auth, &OrderId(id)).await?,
    ))
}

/// GET /orders/organization
pub async fn list_org_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<OrgOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state
        .order_service
        .list_org(&auth, query.organization_id, query.status)
        .await?;
    Ok(Json(orders))
}

/// PATCH /orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_service
        .update_status(&auth, &OrderId(id), request.status)
        .await?;
    Ok(Json(order))
}
