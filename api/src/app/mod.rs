//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services check the caller's role and tenant, validate input, and
//! coordinate the repository ports.

pub mod attendance_service;
pub mod auth_service;
pub mod billing_service;
pub mod cart_service;
pub mod catalog_service;
pub mod order_service;
pub mod organization_service;
pub mod payroll_service;
pub mod user_service;

pub use attendance_service::{AttendanceService, BulkMarkResult, MarkAttendance};
pub use auth_service::{AuthService, RegisterCustomer};
pub use billing_service::{BillingService, BillingSummary, CreateBill};
pub use cart_service::{CartService, CartView, CheckoutRequest};
pub use catalog_service::{CatalogService, CreateProduct};
pub use order_service::OrderService;
pub use organization_service::{CreateOrganization, OrganizationService};
pub use payroll_service::{PayrollReport, PayrollService, SalaryStatement};
pub use user_service::{CreateStaff, UserService};

/// Human-readable document number, e.g. `INV-20240501-3FA9C2`
pub(crate) fn document_number(prefix: &str) -> String {
    let suffix: [u8; 3] = rand::random();
    format!(
        "{}-{}-{}",
        prefix,
        chrono::Utc::now().format("%Y%m%d"),
        hex::encode_upper(suffix)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_number_format() {
        let number = document_number("ORD");
        let parts: Vec<_> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn document_numbers_differ() {
        assert_ne!(document_number("INV"), document_number("INV"));
    }
}
