//! Bill (point-of-sale invoice) domain entity
//!
//! Holds the bill totals arithmetic:
//!
//! - subtotal = Σ unit_price × quantity
//! - discount = explicit amount, else subtotal × percentage / 100, else 0
//! - tax = explicit amount, else subtotal × percentage / 100, else the
//!   organization's GST percentage on the subtotal, else 0
//! - total = subtotal − discount + tax
//!
//! Every figure is rounded to 2 decimals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::round_money;
use super::organization::OrganizationId;
use super::product::ProductId;
use super::user::UserId;
use crate::error::DomainError;

uuid_id!(
    /// Unique identifier for a bill
    BillId
);

/// Payment state of a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// `paid` when nothing is due, `pending` when nothing was paid, else `partial`
    pub fn derive(total: f64, paid: f64) -> Self {
        let due = round_money(total - paid);
        if due <= 0.0 {
            PaymentStatus::Paid
        } else if paid <= 0.0 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Partial
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Partial => write!(f, "partial"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            "paid" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

/// Paid/due amounts and the status derived from them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentState {
    pub paid_amount: f64,
    pub due_amount: f64,
    pub status: PaymentStatus,
}

impl PaymentState {
    /// Settle `paid` against `total`; negative payments and overpayment are rejected
    pub fn resolve(total: f64, paid: f64) -> Result<Self, DomainError> {
        let paid_amount = round_money(paid);
        if paid_amount < 0.0 {
            return Err(DomainError::Validation(
                "Paid amount cannot be negative".to_string(),
            ));
        }
        let due_amount = round_money(total - paid_amount);
        if due_amount < 0.0 {
            return Err(DomainError::Validation(format!(
                "Paid amount {:.2} exceeds bill total {:.2}",
                paid_amount, total
            )));
        }
        Ok(Self {
            paid_amount,
            due_amount,
            status: PaymentStatus::derive(total, paid_amount),
        })
    }
}

/// Optional discount and tax inputs; amounts take precedence over percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BillAdjustments {
    pub discount_amount: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub tax_amount: Option<f64>,
    pub tax_percentage: Option<f64>,
}

impl BillAdjustments {
    /// Range checks on the raw inputs
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("discount_amount", self.discount_amount),
            ("tax_amount", self.tax_amount),
        ] {
            if matches!(value, Some(v) if v < 0.0) {
                errors.push(format!("{} cannot be negative", field));
            }
        }
        for (field, value) in [
            ("discount_percentage", self.discount_percentage),
            ("tax_percentage", self.tax_percentage),
        ] {
            if matches!(value, Some(v) if !(0.0..=100.0).contains(&v)) {
                errors.push(format!("{} must be between 0 and 100", field));
            }
        }
        errors
    }

    pub fn discount(&self, subtotal: f64) -> f64 {
        match (self.discount_amount, self.discount_percentage) {
            (Some(amount), _) => round_money(amount),
            (None, Some(pct)) => round_money(subtotal * pct / 100.0),
            (None, None) => 0.0,
        }
    }

    pub fn tax(&self, subtotal: f64, default_tax_percentage: Option<f64>) -> f64 {
        match (self.tax_amount, self.tax_percentage, default_tax_percentage) {
            (Some(amount), _, _) => round_money(amount),
            (None, Some(pct), _) | (None, None, Some(pct)) => round_money(subtotal * pct / 100.0),
            (None, None, None) => 0.0,
        }
    }
}

/// A bill line with its price resolved from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

impl PricedLine {
    pub fn line_total(&self) -> f64 {
        round_money(self.unit_price * self.quantity as f64)
    }
}

/// Computed bill amounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

impl BillTotals {
    pub fn compute(
        lines: &[PricedLine],
        adjustments: &BillAdjustments,
        default_tax_percentage: Option<f64>,
    ) -> Result<Self, DomainError> {
        let subtotal = round_money(lines.iter().map(|l| l.unit_price * l.quantity as f64).sum());
        let discount_amount = adjustments.discount(subtotal);
        if discount_amount > subtotal {
            return Err(DomainError::Validation(format!(
                "Discount {:.2} exceeds subtotal {:.2}",
                discount_amount, subtotal
            )));
        }
        let tax_amount = adjustments.tax(subtotal, default_tax_percentage);
        let total_amount = round_money(subtotal - discount_amount + tax_amount);

        Ok(Self {
            subtotal,
            discount_amount,
            tax_amount,
            total_amount,
        })
    }
}

/// A stored bill
#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    pub id: BillId,
    pub organization_id: OrganizationId,
    pub bill_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub due_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored bill line
#[derive(Debug, Clone, Serialize)]
pub struct BillItem {
    pub id: Uuid,
    pub bill_id: BillId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillWithItems {
    #[serde(flatten)]
    pub bill: Bill,
    pub items: Vec<BillItem>,
}

/// A requested bill line, before pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BillLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Data needed to create a bill
#[derive(Debug, Clone)]
pub struct NewBill {
    pub organization_id: OrganizationId,
    pub bill_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub lines: Vec<BillLine>,
    pub adjustments: BillAdjustments,
    /// Organization GST used when the request carries no tax input
    pub default_tax_percentage: Option<f64>,
    pub paid_amount: f64,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
}

/// Filters for listing bills
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub payment_status: Option<PaymentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Zero means no limit
    pub limit: u64,
    pub offset: u64,
}

impl BillFilter {
    pub fn matches(&self, bill: &Bill) -> bool {
        let day = bill.created_at.date_naive();
        self.payment_status.map_or(true, |s| bill.payment_status == s)
            && self.from.map_or(true, |from| day >= from)
            && self.to.map_or(true, |to| day <= to)
    }
}

/// Aggregate figures over a set of bills
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillSummary {
    pub bill_count: u64,
    pub total_billed: f64,
    pub total_paid: f64,
    pub total_due: f64,
    pub pending_count: u64,
    pub partial_count: u64,
    pub paid_count: u64,
}

impl BillSummary {
    pub fn from_bills<'a>(bills: impl IntoIterator<Item = &'a Bill>) -> Self {
        let mut summary = BillSummary::default();
        for bill in bills {
            summary.bill_count += 1;
            summary.total_billed += bill.total_amount;
            summary.total_paid += bill.paid_amount;
            summary.total_due += bill.due_amount;
            match bill.payment_status {
                PaymentStatus::Pending => summary.pending_count += 1,
                PaymentStatus::Partial => summary.partial_count += 1,
                PaymentStatus::Paid => summary.paid_count += 1,
            }
        }
        summary.total_billed = round_money(summary.total_billed);
        summary.total_paid = round_money(summary.total_paid);
        summary.total_due = round_money(summary.total_due);
        summary
    }
}
