//! Organization service
//!
//! Super admins manage tenants; an organization's admin may edit its tax
//! and contact details.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entities::{
    slugify, AuthUser, NewOrganization, Organization, OrganizationId, OrganizationUpdate, Role,
};
use crate::domain::ports::OrganizationRepository;
use crate::error::{AppError, DomainError};

/// Request to create an organization
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub gst_percentage: Option<f64>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Service for managing organizations
pub struct OrganizationService<OR>
where
    OR: OrganizationRepository,
{
    orgs: Arc<OR>,
}

impl<OR> OrganizationService<OR>
where
    OR: OrganizationRepository,
{
    pub fn new(orgs: Arc<OR>) -> Self {
        Self { orgs }
    }

    pub async fn create(
        &self,
        auth: &AuthUser,
        request: &CreateOrganization,
    ) -> Result<Organization, AppError> {
        auth.require(Role::SuperAdmin)?;

        let name = request.name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Organization name is required".to_string(),
            ));
        }
        validate_gst(request.gst_percentage)?;

        if self.orgs.find_by_slug(&slug).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "Organization '{}' already exists",
                slug
            ))));
        }

        let org = self
            .orgs
            .create(&NewOrganization {
                name: name.to_string(),
                slug,
                gst_percentage: request.gst_percentage,
                address: request.address.clone(),
                phone: request.phone.clone(),
            })
            .await?;

        tracing::info!(org_id = %org.id, slug = %org.slug, "Organization created");
        Ok(org)
    }

    pub async fn list(
        &self,
        auth: &AuthUser,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Organization>, AppError> {
        auth.require(Role::SuperAdmin)?;
        Ok(self.orgs.list(limit, offset).await?)
    }

    pub async fn get(&self, auth: &AuthUser, id: &OrganizationId) -> Result<Organization, AppError> {
        auth.require(Role::Admin)?;
        auth.ensure_org(*id)?;

        self.orgs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Organization {}", id)))
    }

    /// Admins may change tax and contact fields; name and activation are
    /// reserved for super admins
    pub async fn update(
        &self,
        auth: &AuthUser,
        id: &OrganizationId,
        update: &OrganizationUpdate,
    ) -> Result<Organization, AppError> {
        auth.require(Role::Admin)?;
        auth.ensure_org(*id)?;

        if !auth.is_super_admin() && (update.name.is_some() || update.is_active.is_some()) {
            return Err(AppError::Forbidden(
                "Only a super admin can rename or deactivate an organization".to_string(),
            ));
        }
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(AppError::BadRequest(
                "Organization name cannot be empty".to_string(),
            ));
        }
        validate_gst(update.gst_percentage)?;

        let org = self.orgs.update(id, update).await?;
        tracing::info!(org_id = %org.id, "Organization updated");
        Ok(org)
    }
}

fn validate_gst(gst: Option<f64>) -> Result<(), AppError> {
    match gst {
        Some(pct) if !(0.0..=100.0).contains(&pct) => Err(AppError::BadRequest(
            "gst_percentage must be between 0 and 100".to_string(),
        )),
        _ => Ok(()),
    }
}
