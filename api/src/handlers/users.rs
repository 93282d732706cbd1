//! User handlers
//!
//! Staff accounts of an organization.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::CreateStaff;
use crate::domain::entities::{AuthUser, OrganizationId, Role, User, UserFilter, UserId, UserUpdate};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Only honoured for super admins
    pub organization_id: Option<OrganizationId>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateStaff>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.user_service.create_staff(&auth, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let filter = UserFilter {
        role: query.role,
        is_active: query.is_active,
    };
    let users = state
        .user_service
        .list(&auth, query.organization_id, &filter)
        .await?;
    Ok(Json(users))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.user_service.get(&auth, &UserId(id)).await?))
}

/// PATCH /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    let user = state
        .user_service
        .update(&auth, &UserId(id), &update)
        .await?;
    Ok(Json(user))
}

/// DELETE /users/:id
///
/// Deactivates the account; records that reference it are kept.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.user_service.deactivate(&auth, &UserId(id)).await?))
}
