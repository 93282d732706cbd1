//! PostgreSQL adapter for AttendanceRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    AttendanceFilter, AttendanceId, AttendanceRecord, AttendanceStatus, AttendanceUpdate,
    NewAttendance, OrganizationId, UserId,
};
use crate::domain::ports::AttendanceRepository;
use crate::entity::attendance;
use crate::error::DomainError;

use super::update_error;

/// PostgreSQL implementation of AttendanceRepository
pub struct PostgresAttendanceRepository {
    db: DatabaseConnection,
}

impl PostgresAttendanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepository {
    async fn upsert(&self, record: &NewAttendance) -> Result<AttendanceRecord, DomainError> {
        let existing = attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(record.user_id.0))
            .filter(attendance::Column::Date.eq(record.date))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let result = match existing {
            Some(row) => {
                let mut model: attendance::ActiveModel = row.into();
                model.status = Set(record.status.to_string());
                model.work_hours = Set(record.work_hours);
                model.sales_amount = Set(record.sales_amount);
                model.check_in = Set(record.check_in);
                model.check_out = Set(record.check_out);
                model.notes = Set(record.notes.clone());
                model.marked_by = Set(record.marked_by.map(|id| id.0));
                model.update(&self.db).await
            }
            None => {
                attendance::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(record.organization_id.0),
                    user_id: Set(record.user_id.0),
                    date: Set(record.date),
                    status: Set(record.status.to_string()),
                    work_hours: Set(record.work_hours),
                    sales_amount: Set(record.sales_amount),
                    check_in: Set(record.check_in),
                    check_out: Set(record.check_out),
                    notes: Set(record.notes.clone()),
                    marked_by: Set(record.marked_by.map(|id| id.0)),
                    created_at: Set(Utc::now().fixed_offset()),
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn find_by_id(
        &self,
        id: &AttendanceId,
    ) -> Result<Option<AttendanceRecord>, DomainError> {
        let result = attendance::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, DomainError> {
        let results = attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(user_id.0))
            .filter(attendance::Column::Date.between(filter.from, filter.to))
            .order_by_asc(attendance::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn update(
        &self,
        id: &AttendanceId,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, DomainError> {
        let mut model = attendance::ActiveModel {
            id: Set(id.0),
            ..Default::default()
        };
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(hours) = update.work_hours {
            model.work_hours = Set(hours);
        }
        if let Some(sales) = update.sales_amount {
            model.sales_amount = Set(sales);
        }
        if let Some(check_in) = update.check_in {
            model.check_in = Set(Some(check_in));
        }
        if let Some(check_out) = update.check_out {
            model.check_out = Set(Some(check_out));
        }
        if let Some(notes) = &update.notes {
            model.notes = Set(Some(notes.clone()));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| update_error(e, format!("Attendance record {}", id)))?;

        Ok(result.into())
    }

    async fn delete(&self, id: &AttendanceId) -> Result<(), DomainError> {
        let result = attendance::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!(
                "Attendance record {} not found",
                id
            )));
        }

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<attendance::Model> for AttendanceRecord {
    fn from(model: attendance::Model) -> Self {
        AttendanceRecord {
            id: AttendanceId(model.id),
            organization_id: OrganizationId(model.organization_id),
            user_id: UserId(model.user_id),
            date: model.date,
            status: model.status.parse().unwrap_or(AttendanceStatus::Absent),
            work_hours: model.work_hours,
            sales_amount: model.sales_amount,
            check_in: model.check_in,
            check_out: model.check_out,
            notes: model.notes,
            marked_by: model.marked_by.map(UserId),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
