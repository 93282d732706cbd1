//! Authentication service
//!
//! Handles customer self-registration, login, and password changes.
//! Passwords are stored as Argon2id PHC strings.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use serde::Deserialize;

use crate::auth::JwtKeys;
use crate::domain::entities::{AuthUser, NewUser, OrganizationId, Role, User};
use crate::domain::ports::{OrganizationRepository, UserRepository};
use crate::error::{AppError, DomainError};

pub const MIN_PASSWORD_LEN: usize = 8;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Self-registration request for a storefront customer
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCustomer {
    pub organization_id: OrganizationId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Service for authentication
pub struct AuthService<UR, OR>
where
    UR: UserRepository,
    OR: OrganizationRepository,
{
    users: Arc<UR>,
    orgs: Arc<OR>,
    keys: Arc<JwtKeys>,
}

impl<UR, OR> AuthService<UR, OR>
where
    UR: UserRepository,
    OR: OrganizationRepository,
{
    pub fn new(users: Arc<UR>, orgs: Arc<OR>, keys: Arc<JwtKeys>) -> Self {
        Self { users, orgs, keys }
    }

    /// Register a customer against an active organization
    pub async fn register_customer(&self, request: &RegisterCustomer) -> Result<User, AppError> {
        let mut errors = Vec::new();
        if request.name.trim().is_empty() {
            errors.push("name is required".to_string());
        }
        errors.extend(credential_errors(&request.email, &request.password));
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        match self.orgs.find_by_id(&request.organization_id).await? {
            Some(org) if org.is_active => {}
            Some(_) => {
                return Err(AppError::BadRequest(
                    "Organization is not accepting registrations".to_string(),
                ))
            }
            None => {
                return Err(AppError::NotFound(format!(
                    "Organization {}",
                    request.organization_id
                )))
            }
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
                organization_id: Some(request.organization_id),
                name: request.name.trim().to_string(),
                email: request.email.clone(),
                password_hash: hash_password_async(request.password.clone()).await?,
                role: Role::Customer,
                phone: request.phone.clone(),
                base_salary: 0.0,
                target_amount: 0.0,
                incentive_percentage: 0.0,
            })
            .await?;

        tracing::info!(user_id = %user.id, org_id = %request.organization_id, "Customer registered");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password_async(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login rejected: bad password");
            return Err(AppError::Unauthorized);
        }
        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        let token = self.keys.issue(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Profile of the caller
    pub async fn me(&self, auth: &AuthUser) -> Result<User, AppError> {
        self.users
            .find_by_id(&auth.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", auth.user_id)))
    }

    /// Replace the caller's password after checking the current one
    pub async fn change_password(
        &self,
        auth: &AuthUser,
        current: &str,
        new: &str,
    ) -> Result<(), AppError> {
        if new.len() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = self.me(auth).await?;
        if !verify_password_async(current.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::Domain(DomainError::Unauthorized(
                "Current password is incorrect".to_string(),
            )));
        }

        self.users
            .update_password(&user.id, &hash_password_async(new.to_string()).await?)
            .await?;
        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Token lifetime in seconds
    pub fn token_ttl(&self) -> i64 {
        self.keys.expires_in()
    }
}

/// Email format and password length checks shared by every signup path
pub fn credential_errors(email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push("email is not a valid address".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    errors
}

pub fn is_valid_email(email: &str) -> bool {
    regex::Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(email.trim()))
        .unwrap_or(false)
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored hash; malformed hashes never match
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Argon2 is CPU-bound; run it on the blocking pool, not a runtime worker
pub async fn hash_password_async(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password_async(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
}
