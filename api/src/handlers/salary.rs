//! Salary handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::{PayrollReport, SalaryStatement};
use crate::domain::entities::{AuthUser, DeductionPolicy, OrganizationId, UserId};
use crate::error::AppError;
use crate::AppState;

use super::attendance::month_or_current;

/// Query parameters for salary endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SalaryQuery {
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
    /// Overrides the configured deduction policy
    pub policy: Option<DeductionPolicy>,
    /// Only honoured for super admins on the report
    pub organization_id: Option<OrganizationId>,
}

/// GET /salary/:user_id?month=YYYY-MM&policy=
pub async fn get_salary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SalaryQuery>,
) -> Result<Json<SalaryStatement>, AppError> {
    let month = month_or_current(query.month.as_deref())?;
    let statement = state
        .payroll_service
        .salary_for(&auth, &UserId(user_id), &month, query.policy)
        .await?;
    Ok(Json(statement))
}

/// GET /salary/report?month=YYYY-MM
pub async fn salary_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SalaryQuery>,
) -> Result<Json<PayrollReport>, AppError> {
    let month = month_or_current(query.month.as_deref())?;
    let report = state
        .payroll_service
        .report(&auth, query.organization_id, &month, query.policy)
        .await?;
    Ok(Json(report))
}
