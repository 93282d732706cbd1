//! Organization handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::CreateOrganization;
use crate::domain::entities::{AuthUser, Organization, OrganizationId, OrganizationUpdate};
use crate::error::AppError;
use crate::AppState;

/// Pagination for listing organizations
#[derive(Debug, Deserialize)]
pub struct ListOrganizationsQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

/// POST /organizations
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateOrganization>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    let org = state.organization_service.create(&auth, &request).await?;
    Ok((StatusCode::CREATED, Json(org)))
}

/// GET /organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListOrganizationsQuery>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let orgs = state
        .organization_service
        .list(&auth, query.limit, query.offset)
        .await?;
    Ok(Json(orgs))
}

/// GET /organizations/:id
pub async fn get_organization(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Organization>, AppError> {
    let org = state
        .organization_service
        .get(&auth, &OrganizationId(id))
        .await?;
    Ok(Json(org))
}

/// PATCH /organizations/:id
pub async fn update_organization(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<OrganizationUpdate>,
) -> Result<Json<Organization>, AppError> {
    let org = state
        .organization_service
        .update(&auth, &OrganizationId(id), &update)
        .await?;
    Ok(Json(org))
}
