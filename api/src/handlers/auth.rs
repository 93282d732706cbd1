//! Authentication handlers
//!
//! Registration, login and the caller's own profile.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::app::RegisterCustomer;
use crate::domain::entities::{AuthUser, User};
use crate::error::AppError;
use crate::AppState;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token (Authorization: Bearer <token>)
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

/// Request body for changing the caller's password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /auth/register
///
/// Register a storefront customer.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterCustomer>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.auth_service.register_customer(&request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (token, user) = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.auth_service.token_ttl(),
        user,
    }))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.auth_service.me(&auth).await?))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .auth_service
        .change_password(&auth, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}
