//! Attendance service
//!
//! Managers mark daily attendance for staff of their organization; staff
//! read their own month.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    AttendanceId, AttendanceRecord, AttendanceStatus, AttendanceUpdate, AuthUser, MonthRange,
    NewAttendance, Role, User, UserId,
};
use crate::domain::ports::{AttendanceRepository, UserRepository};
use crate::error::AppError;

const MAX_WORK_HOURS: f64 = 24.0;

/// Request to mark one user's attendance for one day
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkAttendance {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub work_hours: Option<f64>,
    pub sales_amount: Option<f64>,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Outcome of one row of a bulk mark
#[derive(Debug, Clone, Serialize)]
pub struct BulkMarkResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Service for attendance records
pub struct AttendanceService<AR, UR>
where
    AR: AttendanceRepository,
    UR: UserRepository,
{
    attendance: Arc<AR>,
    users: Arc<UR>,
}

impl<AR, UR> AttendanceService<AR, UR>
where
    AR: AttendanceRepository,
    UR: UserRepository,
{
    pub fn new(attendance: Arc<AR>, users: Arc<UR>) -> Self {
        Self { attendance, users }
    }

    /// Insert or replace the record for the user and date
    pub async fn mark(
        &self,
        auth: &AuthUser,
        request: &MarkAttendance,
    ) -> Result<AttendanceRecord, AppError> {
        auth.require(Role::Manager)?;
        let user = self.staff_member(auth, &request.user_id).await?;
        let org_id = user
            .organization_id
            .ok_or_else(|| AppError::BadRequest("User has no organization".to_string()))?;

        if request.date > Utc::now().date_naive() {
            return Err(AppError::BadRequest(
                "Attendance cannot be marked for a future date".to_string(),
            ));
        }

        let work_hours = request.status.work_hours_or_default(request.work_hours);
        let sales_amount = request.sales_amount.unwrap_or(0.0);
        let errors = record_errors(Some(work_hours), Some(sales_amount));
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let record = self
            .attendance
            .upsert(&NewAttendance {
                organization_id: org_id,
                user_id: user.id,
                date: request.date,
                status: request.status,
                work_hours,
                sales_amount,
                check_in: request.check_in,
                check_out: request.check_out,
                notes: request.notes.clone(),
                marked_by: Some(auth.user_id),
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            org_id = %org_id,
            date = %record.date,
            status = %record.status,
            "Attendance marked"
        );
        Ok(record)
    }

    /// Mark many rows; each row succeeds or fails on its own
    pub async fn bulk_mark(
        &self,
        auth: &AuthUser,
        requests: &[MarkAttendance],
    ) -> Result<Vec<BulkMarkResult>, AppError> {
        auth.require(Role::Manager)?;

        let mut results = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let result = match self.mark(auth, request).await {
                Ok(record) => BulkMarkResult {
                    index,
                    success: true,
                    record: Some(record),
                    error: None,
                },
                Err(e) => {
                    tracing::debug!(index, error = %e, "Bulk attendance row rejected");
                    BulkMarkResult {
                        index,
                        success: false,
                        record: None,
                        error: Some(e.public_message()),
                    }
                }
            };
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.success).count();
        tracing::info!(rows = results.len(), failed, "Bulk attendance processed");
        Ok(results)
    }

    /// A user's records for a month. Self, or a manager of their organization.
    pub async fn list(
        &self,
        auth: &AuthUser,
        user_id: &UserId,
        month: &MonthRange,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let user = self.visible_user(auth, user_id).await?;
        Ok(self
            .attendance
            .list_for_user(&user.id, &month.as_filter())
            .await?)
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        id: &AttendanceId,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, AppError> {
        auth.require(Role::Manager)?;
        let record = self.owned(auth, id).await?;

        // A new status without explicit hours takes that status' default
        let mut update = update.clone();
        if let (Some(status), None) = (update.status, update.work_hours) {
            if status != record.status {
                update.work_hours = Some(status.default_work_hours());
            }
        }

        let errors = record_errors(update.work_hours, update.sales_amount);
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let updated = self.attendance.update(id, &update).await?;
        tracing::info!(attendance_id = %id, user_id = %updated.user_id, "Attendance updated");
        Ok(updated)
    }

    pub async fn delete(&self, auth: &AuthUser, id: &AttendanceId) -> Result<(), AppError> {
        auth.require(Role::Manager)?;
        self.owned(auth, id).await?;

        self.attendance.delete(id).await?;
        tracing::info!(attendance_id = %id, "Attendance deleted");
        Ok(())
    }

    async fn visible_user(&self, auth: &AuthUser, user_id: &UserId) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;
        if !auth.can_manage(&user) {
            return Err(AppError::Forbidden(
                "Cannot view attendance of this user".to_string(),
            ));
        }
        Ok(user)
    }

    async fn staff_member(&self, auth: &AuthUser, user_id: &UserId) -> Result<User, AppError> {
        let user = self.visible_user(auth, user_id).await?;
        if !user.role.is_staff() {
            return Err(AppError::BadRequest(format!(
                "Attendance is only tracked for staff, not {}",
                user.role
            )));
        }
        if !user.is_active {
            return Err(AppError::BadRequest("User is deactivated".to_string()));
        }
        Ok(user)
    }

    async fn owned(
        &self,
        auth: &AuthUser,
        id: &AttendanceId,
    ) -> Result<AttendanceRecord, AppError> {
        let record = self
            .attendance
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance record {}", id)))?;
        auth.ensure_org(record.organization_id)?;
        Ok(record)
    }
}

fn record_errors(work_hours: Option<f64>, sales: Option<f64>) -> Vec<String> {
    let mut errors = Vec::new();
    if matches!(work_hours, Some(h) if !(0.0..=MAX_WORK_HOURS).contains(&h)) {
        errors.push(format!(
            "work_hours must be between 0 and {}",
            MAX_WORK_HOURS
        ));
    }
    if matches!(sales, Some(s) if s < 0.0) {
        errors.push("sales_amount cannot be negative".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OrganizationId;
    use crate::test_utils::{
        auth_for, date, test_attendance, test_employee, test_org, test_user,
        InMemoryAttendanceRepository, InMemoryUserRepository,
    };

    struct Fixture {
        service: AttendanceService<InMemoryAttendanceRepository, InMemoryUserRepository>,
        attendance: Arc<InMemoryAttendanceRepository>,
    }

    fn create_service(
        attendance: InMemoryAttendanceRepository,
        users: InMemoryUserRepository,
    ) -> Fixture {
        let attendance = Arc::new(attendance);
        Fixture {
            service: AttendanceService::new(attendance.clone(), Arc::new(users)),
            attendance,
        }
    }

    fn mark(user: &User, day: NaiveDate, status: AttendanceStatus) -> MarkAttendance {
        MarkAttendance {
            user_id: user.id,
            date: day,
            status,
            work_hours: None,
            sales_amount: None,
            check_in: None,
            check_out: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn mark_defaults_work_hours() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new(),
            InMemoryUserRepository::new().with_user(employee.clone()),
        );

        let record = fx
            .service
            .mark(
                &auth_for(&manager),
                &mark(&employee, date(2024, 5, 2), AttendanceStatus::HalfDay),
            )
            .await
            .unwrap();

        assert_eq!(record.work_hours, 4.0);
        assert_eq!(record.sales_amount, 0.0);
        assert_eq!(record.marked_by, Some(manager.id));
    }

    #[tokio::test]
    async fn marking_twice_replaces_the_day() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new(),
            InMemoryUserRepository::new().with_user(employee.clone()),
        );
        let auth = auth_for(&manager);

        fx.service
            .mark(&auth, &mark(&employee, date(2024, 5, 2), AttendanceStatus::Absent))
            .await
            .unwrap();
        let record = fx
            .service
            .mark(&auth, &mark(&employee, date(2024, 5, 2), AttendanceStatus::Late))
            .await
            .unwrap();

        assert_eq!(fx.attendance.count(), 1);
        assert_eq!(record.status, AttendanceStatus::Late);
        assert_eq!(record.work_hours, 7.0);
    }

    #[tokio::test]
    async fn future_dates_are_rejected() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new(),
            InMemoryUserRepository::new().with_user(employee.clone()),
        );
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();

        let result = fx
            .service
            .mark(
                &auth_for(&manager),
                &mark(&employee, tomorrow, AttendanceStatus::Present),
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn customers_are_not_tracked() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let customer = test_user(Role::Customer, Some(org.id));
        let fx = create_service(
            InMemoryAttendanceRepository::new(),
            InMemoryUserRepository::new().with_user(customer.clone()),
        );

        let result = fx
            .service
            .mark(
                &auth_for(&manager),
                &mark(&customer, date(2024, 5, 2), AttendanceStatus::Present),
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn bulk_mark_keeps_going_past_bad_rows() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let outsider = test_employee(OrganizationId::new(), 15000.0, 0.0, 0.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new(),
            InMemoryUserRepository::new()
                .with_user(employee.clone())
                .with_user(outsider.clone()),
        );
        let mut bad_hours = mark(&employee, date(2024, 5, 3), AttendanceStatus::Present);
        bad_hours.work_hours = Some(30.0);

        let results = fx
            .service
            .bulk_mark(
                &auth_for(&manager),
                &[
                    mark(&employee, date(2024, 5, 2), AttendanceStatus::Present),
                    bad_hours,
                    mark(&outsider, date(2024, 5, 2), AttendanceStatus::Present),
                    mark(&employee, date(2024, 5, 4), AttendanceStatus::Holiday),
                ],
            )
            .await
            .unwrap();

        let outcome: Vec<_> = results.iter().map(|r| (r.index, r.success)).collect();
        assert_eq!(outcome, vec![(0, true), (1, false), (2, false), (3, true)]);
        assert!(results[1].error.is_some());
        assert_eq!(fx.attendance.count(), 2);
    }

    #[tokio::test]
    async fn bulk_mark_hides_storage_errors() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new().failing_on(date(2024, 5, 3)),
            InMemoryUserRepository::new().with_user(employee.clone()),
        );

        let results = fx
            .service
            .bulk_mark(
                &auth_for(&manager),
                &[
                    mark(&employee, date(2024, 5, 2), AttendanceStatus::Present),
                    mark(&employee, date(2024, 5, 3), AttendanceStatus::Present),
                ],
            )
            .await
            .unwrap();

        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[1].error.as_deref(), Some("Internal server error"));
        assert_eq!(fx.attendance.count(), 1);
    }

    #[tokio::test]
    async fn employee_lists_own_month_only() {
        let org = test_org();
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let colleague = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new()
                .with_record(test_attendance(
                    &employee,
                    date(2024, 5, 2),
                    AttendanceStatus::Present,
                    0.0,
                ))
                .with_record(test_attendance(
                    &employee,
                    date(2024, 6, 1),
                    AttendanceStatus::Present,
                    0.0,
                )),
            InMemoryUserRepository::new()
                .with_user(employee.clone())
                .with_user(colleague.clone()),
        );
        let auth = auth_for(&employee);
        let may = MonthRange::parse("2024-05").unwrap();

        assert_eq!(fx.service.list(&auth, &employee.id, &may).await.unwrap().len(), 1);
        assert!(matches!(
            fx.service.list(&auth, &colleague.id, &may).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn status_change_resets_hours() {
        let org = test_org();
        let manager = test_user(Role::Manager, Some(org.id));
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let record = test_attendance(&employee, date(2024, 5, 2), AttendanceStatus::Present, 0.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new().with_record(record.clone()),
            InMemoryUserRepository::new().with_user(employee.clone()),
        );

        let updated = fx
            .service
            .update(
                &auth_for(&manager),
                &record.id,
                &AttendanceUpdate {
                    status: Some(AttendanceStatus::HalfDay),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, AttendanceStatus::HalfDay);
        assert_eq!(updated.work_hours, 4.0);
    }

    #[tokio::test]
    async fn employee_cannot_delete() {
        let org = test_org();
        let employee = test_employee(org.id, 15000.0, 10000.0, 2.0);
        let record = test_attendance(&employee, date(2024, 5, 2), AttendanceStatus::Present, 0.0);
        let fx = create_service(
            InMemoryAttendanceRepository::new().with_record(record.clone()),
            InMemoryUserRepository::new().with_user(employee.clone()),
        );

        assert!(fx.service.delete(&auth_for(&employee), &record.id).await.is_err());
        assert_eq!(fx.attendance.count(), 1);
    }
}
