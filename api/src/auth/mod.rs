//! Bearer token authentication

pub mod jwt;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::AppState;

pub use jwt::JwtKeys;

/// Extract the token from the Authorization header
fn extract_bearer(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Authentication middleware
///
/// Verifies the bearer token and injects the `AuthUser` into request
/// extensions. Verification is stateless; no database lookup is made.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(&request).ok_or(AppError::Unauthorized)?;

    let auth = state.jwt.verify(token)?;

    request.extensions_mut().insert(auth);

    Ok(next.run(request).await)
}
