//! User service
//!
//! Staff management inside an organization.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entities::{
    AuthUser, NewUser, OrganizationId, Role, User, UserFilter, UserId, UserUpdate,
};
use crate::domain::ports::UserRepository;
use crate::error::{AppError, DomainError};

use super::auth_service::{credential_errors, hash_password_async};

/// Request to create a staff account
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaff {
    /// Only honoured for super admins
    pub organization_id: Option<OrganizationId>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    #[serde(default)]
    pub base_salary: f64,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub incentive_percentage: f64,
}

/// Service for managing users
pub struct UserService<UR>
where
    UR: UserRepository,
{
    users: Arc<UR>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    pub fn new(users: Arc<UR>) -> Self {
        Self { users }
    }

    /// Create an employee, manager or admin in the caller's organization
    pub async fn create_staff(
        &self,
        auth: &AuthUser,
        request: &CreateStaff,
    ) -> Result<User, AppError> {
        auth.require(Role::Admin)?;
        let org_id = auth.scope_org(request.organization_id)?;

        if !request.role.is_staff() {
            return Err(AppError::BadRequest(format!(
                "Cannot create a {} account here",
                request.role
            )));
        }
        if request.role == Role::Admin && !auth.is_super_admin() {
            return Err(AppError::Forbidden(
                "Only a super admin can create admins".to_string(),
            ));
        }

        let mut errors = Vec::new();
        if request.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        errors.extend(credential_errors(&request.email, &request.password));
        errors.extend(salary_errors(
            Some(request.base_salary),
            Some(request.target_amount),
            Some(request.incentive_percentage),
        ));
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "Email '{}' is already registered",
                request.email.trim()
            ))));
        }

        let user = self
            .users
            .create(&NewUser {
                organization_id: Some(org_id),
                name: request.name.trim().to_string(),
                email: request.email.clone(),
                password_hash: hash_password_async(request.password.clone()).await?,
                role: request.role,
                phone: request.phone.clone(),
                base_salary: request.base_salary,
                target_amount: request.target_amount,
                incentive_percentage: request.incentive_percentage,
            })
            .await?;

        tracing::info!(user_id = %user.id, org_id = %org_id, role = %user.role, "Staff user created");
        Ok(user)
    }

    pub async fn list(
        &self,
        auth: &AuthUser,
        org: Option<OrganizationId>,
        filter: &UserFilter,
    ) -> Result<Vec<User>, AppError> {
        auth.require(Role::Manager)?;
        let org_id = auth.scope_org(org)?;
        Ok(self.users.list_by_org(&org_id, filter).await?)
    }

    /// Self, or a manager of the same organization
    pub async fn get(&self, auth: &AuthUser, id: &UserId) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;

        if !auth.can_manage(&user) {
            return Err(AppError::Forbidden(
                "Cannot view this user".to_string(),
            ));
        }
        Ok(user)
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<User, AppError> {
        auth.require(Role::Admin)?;
        let target = self.get(auth, id).await?;

        if matches!(update.role, Some(Role::Admin | Role::SuperAdmin)) && !auth.is_super_admin() {
            return Err(AppError::Forbidden(
                "Only a super admin can grant admin roles".to_string(),
            ));
        }
        if target.role.at_least(Role::Admin) && !auth.is_super_admin() && target.id != auth.user_id
        {
            return Err(AppError::Forbidden(
                "Only a super admin can modify another admin".to_string(),
            ));
        }
        if update.is_active == Some(false) && target.id == auth.user_id {
            return Err(AppError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        let mut errors = salary_errors(
            update.base_salary,
            update.target_amount,
            update.incentive_percentage,
        );
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            errors.push("name cannot be empty".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let user = self.users.update(id, update).await?;
        tracing::info!(user_id = %user.id, updated_by = %auth.user_id, "User updated");
        Ok(user)
    }

    pub async fn deactivate(&self, auth: &AuthUser, id: &UserId) -> Result<User, AppError> {
        self.update(
            auth,
            id,
            &UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}

fn salary_errors(base: Option<f64>, target: Option<f64>, pct: Option<f64>) -> Vec<String> {
    let mut errors = Vec::new();
    if matches!(base, Some(v) if v < 0.0) {
        errors.push("base_salary cannot be negative".to_string());
    }
    if matches!(target, Some(v) if v < 0.0) {
        errors.push("target_amount cannot be negative".to_string());
    }
    if matches!(pct, Some(v) if !(0.0..=100.0).contains(&v)) {
        errors.push("incentive_percentage must be between 0 and 100".to_string());
    }
    errors
}
