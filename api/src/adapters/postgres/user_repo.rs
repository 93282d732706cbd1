//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    NewUser, OrganizationId, Role, User, UserFilter, UserId, UserUpdate,
};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

use super::update_error;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_by_org(
        &self,
        org_id: &OrganizationId,
        filter: &UserFilter,
    ) -> Result<Vec<User>, DomainError> {
        let mut query = users::Entity::find().filter(users::Column::OrganizationId.eq(org_id.0));
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(role.to_string()));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(users::Column::IsActive.eq(active));
        }

        let results = query
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(user.organization_id.map(|id| id.0)),
            name: Set(user.name.clone()),
            email: Set(user.email.trim().to_lowercase()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role.to_string()),
            phone: Set(user.phone.clone()),
            base_salary: Set(user.base_salary),
            target_amount: Set(user.target_amount),
            incentive_percentage: Set(user.incentive_percentage),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<User, DomainError> {
        let mut model = users::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        if let Some(name) = &update.name {
            model.name = Set(name.clone());
        }
        if let Some(phone) = &update.phone {
            model.phone = Set(Some(phone.clone()));
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(base) = update.base_salary {
            model.base_salary = Set(base);
        }
        if let Some(target) = update.target_amount {
            model.target_amount = Set(target);
        }
        if let Some(pct) = update.incentive_percentage {
            model.incentive_percentage = Set(pct);
        }
        if let Some(active) = update.is_active {
            model.is_active = Set(active);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| update_error(e, format!("User {}", id)))?;

        Ok(result.into())
    }

    async fn update_password(&self, id: &UserId, password_hash: &str) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            password_hash: Set(password_hash.to_string()),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| update_error(e, format!("User {}", id)))?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            organization_id: model.organization_id.map(OrganizationId),
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role.parse().unwrap_or(Role::Customer),
            phone: model.phone,
            base_salary: model.base_salary,
            target_amount: model.target_amount,
            incentive_percentage: model.incentive_percentage,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
