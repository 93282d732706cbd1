//! PostgreSQL adapter for OrganizationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{NewOrganization, Organization, OrganizationId, OrganizationUpdate};
use crate::domain::ports::OrganizationRepository;
use crate::entity::organizations;
use crate::error::DomainError;

use super::update_error;

/// PostgreSQL implementation of OrganizationRepository
pub struct PostgresOrganizationRepository {
    db: DatabaseConnection,
}

impl PostgresOrganizationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError> {
        let result = organizations::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, DomainError> {
        let result = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Organization>, DomainError> {
        let results = organizations::Entity::find()
            .order_by_desc(organizations::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, org: &NewOrganization) -> Result<Organization, DomainError> {
        let model = organizations::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(org.name.clone()),
            slug: Set(org.slug.clone()),
            gst_percentage: Set(org.gst_percentage),
            address: Set(org.address.clone()),
            phone: Set(org.phone.clone()),
            is_active: Set(true),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &OrganizationId,
        update: &OrganizationUpdate,
    ) -> Result<Organization, DomainError> {
        let mut model = organizations::ActiveModel {
            id: Set(id.0),
            ..Default::default()
        };
        if let Some(name) = &update.name {
            model.name = Set(name.clone());
        }
        if let Some(gst) = update.gst_percentage {
            model.gst_percentage = Set(Some(gst));
        }
        if let Some(address) = &update.address {
            model.address = Set(Some(address.clone()));
        }
        if let Some(phone) = &update.phone {
            model.phone = Set(Some(phone.clone()));
        }
        if let Some(active) = update.is_active {
            model.is_active = Set(active);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| update_error(e, format!("Organization {}", id)))?;

        Ok(result.into())
    }
}

/// Convert SeaORM model to domain entity
impl From<organizations::Model> for Organization {
    fn from(model: organizations::Model) -> Self {
        Organization {
            id: OrganizationId(model.id),
            name: model.name,
            slug: model.slug,
            gst_percentage: model.gst_percentage,
            address: model.address,
            phone: model.phone,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
