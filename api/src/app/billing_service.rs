//! Billing service
//!
//! Point-of-sale bills: staff ring up items, stock is taken and totals are
//! computed in one step; payments can be recorded later.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    AuthUser, Bill, BillAdjustments, BillFilter, BillId, BillLine, BillSummary, BillWithItems,
    NewBill, OrganizationId, Role,
};
use crate::domain::ports::{BillRepository, OrganizationRepository};
use crate::error::AppError;

use super::document_number;

/// Request to create a bill
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBill {
    /// Only honoured for super admins
    pub organization_id: Option<OrganizationId>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Vec<BillLine>,
    #[serde(flatten)]
    pub adjustments: BillAdjustments,
    #[serde(default)]
    pub paid_amount: f64,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Bill summary over a date range
#[derive(Debug, Clone, Serialize)]
pub struct BillingSummary {
    pub organization_id: OrganizationId,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(flatten)]
    pub summary: BillSummary,
}

/// Service for bills
pub struct BillingService<BR, OR>
where
    BR: BillRepository,
    OR: OrganizationRepository,
{
    bills: Arc<BR>,
    orgs: Arc<OR>,
}

impl<BR, OR> BillingService<BR, OR>
where
    BR: BillRepository,
    OR: OrganizationRepository,
{
    pub fn new(bills: Arc<BR>, orgs: Arc<OR>) -> Self {
        Self { bills, orgs }
    }

    pub async fn create(
        &self,
        auth: &AuthUser,
        request: &CreateBill,
    ) -> Result<BillWithItems, AppError> {
        auth.require(Role::Employee)?;
        let org_id = auth.scope_org(request.organization_id)?;

        let mut errors = request.adjustments.validate();
        if request.items.is_empty() {
            errors.push("at least one item is required".to_string());
        }
        if request.items.iter().any(|l| l.quantity <= 0) {
            errors.push("item quantities must be positive".to_string());
        }
        if request.paid_amount < 0.0 {
            errors.push("paid_amount cannot be negative".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let org = self
            .orgs
            .find_by_id(&org_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Organization {}", org_id)))?;

        let bill = self
            .bills
            .create(&NewBill {
                organization_id: org_id,
                bill_number: document_number("INV"),
                customer_name: request.customer_name.clone(),
                customer_phone: request.customer_phone.clone(),
                lines: request.items.clone(),
                adjustments: request.adjustments,
                default_tax_percentage: org.gst_percentage,
                paid_amount: request.paid_amount,
                payment_method: request.payment_method.clone(),
                notes: request.notes.clone(),
                created_by: Some(auth.user_id),
            })
            .await?;

        tracing::info!(
            bill_id = %bill.bill.id,
            org_id = %org_id,
            bill_number = %bill.bill.bill_number,
            total = bill.bill.total_amount,
            status = %bill.bill.payment_status,
            "Bill created"
        );
        Ok(bill)
    }

    pub async fn list(
        &self,
        auth: &AuthUser,
        org: Option<OrganizationId>,
        filter: &BillFilter,
    ) -> Result<Vec<Bill>, AppError> {
        auth.require(Role::Employee)?;
        let org_id = auth.scope_org(org)?;
        check_range(filter)?;
        Ok(self.bills.list(&org_id, filter).await?)
    }

    pub async fn get(&self, auth: &AuthUser, id: &BillId) -> Result<BillWithItems, AppError> {
        auth.require(Role::Employee)?;
        let bill = self
            .bills
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bill {}", id)))?;
        auth.ensure_org(bill.bill.organization_id)?;
        Ok(bill)
    }

    /// Add a payment; the bill can never be paid beyond its total
    pub async fn record_payment(
        &self,
        auth: &AuthUser,
        id: &BillId,
        amount: f64,
    ) -> Result<Bill, AppError> {
        let bill = self.get(auth, id).await?;
        if amount <= 0.0 {
            return Err(AppError::BadRequest(
                "Payment amount must be positive".to_string(),
            ));
        }

        let updated = self.bills.record_payment(id, amount).await?;
        tracing::info!(
            bill_id = %id,
            org_id = %bill.bill.organization_id,
            amount,
            due = updated.due_amount,
            status = %updated.payment_status,
            "Payment recorded"
        );
        Ok(updated)
    }

    pub async fn summary(
        &self,
        auth: &AuthUser,
        org: Option<OrganizationId>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<BillingSummary, AppError> {
        auth.require(Role::Manager)?;
        let org_id = auth.scope_org(org)?;
        let filter = BillFilter {
            from,
            to,
            ..Default::default()
        };
        check_range(&filter)?;

        let bills = self.bills.list(&org_id, &filter).await?;
        Ok(BillingSummary {
            organization_id: org_id,
            from,
            to,
            summary: BillSummary::from_bills(&bills),
        })
    }
}

fn check_range(filter: &BillFilter) -> Result<(), AppError> {
    match (filter.from, filter.to) {
        (Some(from), Some(to)) if from > to => Err(AppError::BadRequest(
            "from must not be after to".to_string(),
        )),
        _ => Ok(()),
    }
}
