//! User domain entity
//!
//! Users are customers of a storefront or staff of an organization.
//! Staff carry the salary parameters used by payroll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::organization::OrganizationId;
use super::salary::SalaryProfile;
use crate::error::DomainError;

uuid_id!(
    /// Unique identifier for a user
    UserId
);

/// Access role, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Employee,
    Manager,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role grants at least the privileges of `min`
    pub fn at_least(self, min: Role) -> bool {
        self >= min
    }

    /// Staff roles are paid and tracked by attendance
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Employee | Role::Manager | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Employee => write!(f, "employee"),
            Role::Manager => write!(f, "manager"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A user account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub organization_id: Option<OrganizationId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub base_salary: f64,
    pub target_amount: f64,
    pub incentive_percentage: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn salary_profile(&self) -> SalaryProfile {
        SalaryProfile {
            base_salary: self.base_salary,
            target_amount: self.target_amount,
            incentive_percentage: self.incentive_percentage,
        }
    }
}

/// Data needed to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub organization_id: Option<OrganizationId>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub base_salary: f64,
    pub target_amount: f64,
    pub incentive_percentage: f64,
}

/// Partial update of a user; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub base_salary: Option<f64>,
    pub target_amount: Option<f64>,
    pub incentive_percentage: Option<f64>,
    pub is_active: Option<bool>,
}

/// Filters for listing users of an organization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// The authenticated caller, as carried by a verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
}

impl AuthUser {
    /// Fail unless the caller holds at least `min`
    pub fn require(&self, min: Role) -> Result<(), DomainError> {
        if self.role.at_least(min) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!("Requires {} role", min)))
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Resolve the organization an org-scoped operation acts on.
    ///
    /// Super admins may target any organization explicitly; everyone else is
    /// pinned to their own organization.
    pub fn scope_org(
        &self,
        requested: Option<OrganizationId>,
    ) -> Result<OrganizationId, DomainError> {
        match (self.organization_id, requested) {
            (_, Some(requested)) if self.is_super_admin() => Ok(requested),
            (Some(own), Some(requested)) if own != requested => Err(DomainError::Forbidden(
                "Cannot access another organization".to_string(),
            )),
            (Some(own), _) => Ok(own),
            (None, _) => Err(DomainError::Validation(
                "organization_id is required".to_string(),
            )),
        }
    }

    /// Fail unless the caller may act on records of `org`
    pub fn ensure_org(&self, org: OrganizationId) -> Result<(), DomainError> {
        if self.is_super_admin() || self.organization_id == Some(org) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Cannot access another organization".to_string(),
            ))
        }
    }

    /// Whether the caller may act on `target` inside their organization
    pub fn can_manage(&self, target: &User) -> bool {
        if self.user_id == target.id {
            return true;
        }
        if self.is_super_admin() {
            return true;
        }
        self.role.at_least(Role::Manager)
            && self.organization_id.is_some()
            && self.organization_id == target.organization_id
    }
}
