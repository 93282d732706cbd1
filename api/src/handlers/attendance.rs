//! Attendance handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::{BulkMarkResult, MarkAttendance};
use crate::domain::entities::{
    AttendanceId, AttendanceRecord, AttendanceUpdate, AuthUser, MonthRange, UserId,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing attendance
#[derive(Debug, Default, Deserialize)]
pub struct AttendanceQuery {
    /// Defaults to the caller
    pub user_id: Option<UserId>,
    /// `YYYY-MM`; defaults to the current month
    pub month: Option<String>,
}

/// Request body for bulk marking
#[derive(Debug, Deserialize)]
pub struct BulkMarkRequest {
    pub records: Vec<MarkAttendance>,
}

/// Resolve an optional `YYYY-MM` parameter, defaulting to this month
pub fn month_or_current(month: Option<&str>) -> Result<MonthRange, AppError> {
    match month {
        Some(value) => Ok(MonthRange::parse(value)?),
        None => Ok(MonthRange::containing(Utc::now().date_naive())),
    }
}

/// POST /attendance
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<MarkAttendance>,
) -> Result<Json<AttendanceRecord>, AppError> {
    Ok(Json(state.attendance_service.mark(&auth, &request).await?))
}

/// POST /attendance/bulk
///
/// Every row is attempted; failures are reported per row.
pub async fn bulk_mark_attendance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<BulkMarkRequest>,
) -> Result<Json<Vec<BulkMarkResult>>, AppError> {
    let results = state
        .attendance_service
        .bulk_mark(&auth, &request.records)
        .await?;
    Ok(Json(results))
}

/// GET /attendance?user_id=&month=YYYY-MM
pub async fn list_attendance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let month = month_or_current(query.month.as_deref())?;
    let user_id = query.user_id.unwrap_or(auth.user_id);

    let records = state
        .attendance_service
        .list(&auth, &user_id, &month)
        .await?;
    Ok(Json(records))
}

/// PATCH /attendance/:id
pub async fn update_attendance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<AttendanceUpdate>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let record = state
        .attendance_service
        .update(&auth, &AttendanceId(id), &update)
        .await?;
    Ok(Json(record))
}

/// DELETE /attendance/:id
pub async fn delete_attendance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .attendance_service
        .delete(&auth, &AttendanceId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
