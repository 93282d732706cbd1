//! Payroll service
//!
//! Turns a month of attendance into a salary breakdown per staff member.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::{
    round_money, AttendanceSummary, AuthUser, DeductionPolicy, MonthRange, OrganizationId, Role,
    SalaryBreakdown, User, UserFilter, UserId,
};
use crate::domain::ports::{AttendanceRepository, UserRepository};
use crate::error::AppError;

/// One staff member's salary for a month
#[derive(Debug, Clone, Serialize)]
pub struct SalaryStatement {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub month: String,
    #[serde(flatten)]
    pub breakdown: SalaryBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayrollTotals {
    pub staff_count: usize,
    pub total_base: f64,
    pub total_incentive: f64,
    pub total_deduction: f64,
    pub total_payout: f64,
}

/// Salaries of every active staff member of an organization
#[derive(Debug, Clone, Serialize)]
pub struct PayrollReport {
    pub organization_id: OrganizationId,
    pub month: String,
    pub policy: DeductionPolicy,
    pub statements: Vec<SalaryStatement>,
    pub totals: PayrollTotals,
}

/// Service for salary computation
pub struct PayrollService<UR, AR>
where
    UR: UserRepository,
    AR: AttendanceRepository,
{
    users: Arc<UR>,
    attendance: Arc<AR>,
    default_policy: DeductionPolicy,
}

impl<UR, AR> PayrollService<UR, AR>
where
    UR: UserRepository,
    AR: AttendanceRepository,
{
    pub fn new(users: Arc<UR>, attendance: Arc<AR>, default_policy: DeductionPolicy) -> Self {
        Self {
            users,
            attendance,
            default_policy,
        }
    }

    /// Salary of one user. Self, or a manager of their organization.
    pub async fn salary_for(
        &self,
        auth: &AuthUser,
        user_id: &UserId,
        month: &MonthRange,
        policy: Option<DeductionPolicy>,
    ) -> Result<SalaryStatement, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;
        if !auth.can_manage(&user) {
            return Err(AppError::Forbidden(
                "Cannot view salary of this user".to_string(),
            ));
        }
        if !user.role.is_staff() {
            return Err(AppError::BadRequest(format!(
                "Salary is only computed for staff, not {}",
                user.role
            )));
        }

        self.statement(&user, month, policy.unwrap_or(self.default_policy))
            .await
    }

    pub async fn report(
        &self,
        auth: &AuthUser,
        org: Option<OrganizationId>,
        month: &MonthRange,
        policy: Option<DeductionPolicy>,
    ) -> Result<PayrollReport, AppError> {
        auth.require(Role::Manager)?;
        let org_id = auth.scope_org(org)?;
        let policy = policy.unwrap_or(self.default_policy);

        let filter = UserFilter {
            is_active: Some(true),
            ..Default::default()
        };
        let staff: Vec<User> = self
            .users
            .list_by_org(&org_id, &filter)
            .await?
            .into_iter()
            .filter(|u| u.role.is_staff())
            .collect();

        let mut statements = Vec::with_capacity(staff.len());
        for user in &staff {
            statements.push(self.statement(user, month, policy).await?);
        }
        let totals = PayrollTotals::from_statements(&statements);

        tracing::info!(
            org_id = %org_id,
            month = %month.label(),
            staff = totals.staff_count,
            payout = totals.total_payout,
            "Payroll report generated"
        );
        Ok(PayrollReport {
            organization_id: org_id,
            month: month.label(),
            policy,
            statements,
            totals,
        })
    }

    async fn statement(
        &self,
        user: &User,
        month: &MonthRange,
        policy: DeductionPolicy,
    ) -> Result<SalaryStatement, AppError> {
        let records = self
            .attendance
            .list_for_user(&user.id, &month.as_filter())
            .await?;
        let summary = AttendanceSummary::from_records(&records);
        let breakdown = SalaryBreakdown::compute(&user.salary_profile(), summary, policy);

        tracing::debug!(
            user_id = %user.id,
            month = %month.label(),
            policy = %policy,
            final_salary = breakdown.final_salary,
            "Salary computed"
        );
        Ok(SalaryStatement {
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
            month: month.label(),
            breakdown,
        })
    }
}

impl PayrollTotals {
    fn from_statements(statements: &[SalaryStatement]) -> Self {
        Self {
            staff_count: statements.len(),
            total_base: sum_of(statements, |b| b.base_salary),
            total_incentive: sum_of(statements, |b| b.incentive),
            total_deduction: sum_of(statements, |b| b.deduction),
            total_payout: sum_of(statements, |b| b.final_salary),
        }
    }
}

fn sum_of(statements: &[SalaryStatement], field: impl Fn(&SalaryBreakdown) -> f64) -> f64 {
    round_money(statements.iter().map(|s| field(&s.breakdown)).sum())
}
