//! Bill handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::{BillingSummary, CreateBill};
use crate::domain::entities::{
    AuthUser, Bill, BillFilter, BillId, BillWithItems, OrganizationId, PaymentStatus,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing bills
#[derive(Debug, Default, Deserialize)]
pub struct ListBillsQuery {
    /// Only honoured for super admins
    pub organization_id: Option<OrganizationId>,
    pub payment_status: Option<PaymentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

/// Query parameters for the bill summary
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub organization_id: Option<OrganizationId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Request body for recording a payment
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: f64,
}

/// POST /bills
pub async fn create_bill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateBill>,
) -> Result<(StatusCode, Json<BillWithItems>), AppError> {
    let bill = state.billing_service.create(&auth, &request).await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

/// GET /bills
pub async fn list_bills(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListBillsQuery>,
) -> Result<Json<Vec<Bill>>, AppError> {
    let filter = BillFilter {
        payment_status: query.payment_status,
        from: query.from,
        to: query.to,
        limit: query.limit,
        offset: query.offset,
    };
    let bills = state
        .billing_service
        .list(&auth, query.organization_id, &filter)
        .await?;
    Ok(Json(bills))
}

/// GET /bills/:id
pub async fn get_bill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillWithItems>, AppError> {
    Ok(Json(state.billing_service.get(&auth, &BillId(id)).await?))
}

/// POST /bills/:id/payments
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<Bill>, AppError> {
    let bill = state
        .billing_service
        .record_payment(&auth, &BillId(id), request.amount)
        .await?;
    Ok(Json(bill))
}

/// GET /bills/summary?from=&to=
pub async fn bill_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<BillingSummary>, AppError> {
    let summary = state
        .billing_service
        .summary(&auth, query.organization_id, query.from, query.to)
        .await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_bill_with_flattened_adjustments() {
        let json = r#"{
            "customer_name": "Walk-in",
            "items": [{"product_id": "550e8400-e29b-41d4-a716-446655440000", "quantity": 2}],
            "discount_percentage": 10,
            "tax_amount": 4.5,
            "paid_amount": 50
        }"#;
        let request: CreateBill = serde_json::from_str(json).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.adjustments.discount_percentage, Some(10.0));
        assert_eq!(request.adjustments.tax_amount, Some(4.5));
        assert!(request.adjustments.discount_amount.is_none());
        assert_eq!(request.paid_amount, 50.0);
    }

    #[test]
    fn paid_amount_defaults_to_zero() {
        let request: CreateBill = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(request.paid_amount, 0.0);
    }

    #[test]
    fn parse_payment_request() {
        let request: RecordPaymentRequest =
            serde_json::from_str(r#"{"amount": 118.0}"#).unwrap();
        assert_eq!(request.amount, 118.0);
    }
}
