//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{NaiveDate, Utc};

use crate::domain::entities::{
    AttendanceId, AttendanceRecord, AttendanceStatus, AuthUser, Organization, OrganizationId,
    Product, ProductId, Role, User, UserId,
};

/// Create a test organization with 18% GST
pub fn test_org() -> Organization {
    Organization {
        id: OrganizationId::new(),
        name: "Corner Shop".to_string(),
        slug: "corner-shop".to_string(),
        gst_percentage: Some(18.0),
        address: Some("12 High Street".to_string()),
        phone: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Create an active user with the given role
pub fn test_user(role: Role, org: Option<OrganizationId>) -> User {
    let id = UserId::new();
    User {
        id,
        organization_id: org,
        name: format!("{} {}", role, &id.0.to_string()[..6]),
        email: format!("{}-{}@example.com", role, &id.0.to_string()[..8]),
        password_hash: String::new(),
        role,
        phone: None,
        base_salary: 0.0,
        target_amount: 0.0,
        incentive_percentage: 0.0,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Create an employee with salary parameters
pub fn test_employee(org: OrganizationId, base: f64, target: f64, pct: f64) -> User {
    User {
        base_salary: base,
        target_amount: target,
        incentive_percentage: pct,
        ..test_user(Role::Employee, Some(org))
    }
}

/// Create an active product
pub fn test_product(org: OrganizationId, name: &str, price: f64, stock: i32) -> Product {
    Product {
        id: ProductId::new(),
        organization_id: org,
        name: name.to_string(),
        sku: None,
        description: None,
        category: Some("general".to_string()),
        price,
        stock_quantity: stock,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// The caller identity carried by a token issued to `user`
pub fn auth_for(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role,
        organization_id: user.organization_id,
    }
}

/// Create an attendance record with the status' default hours
pub fn test_attendance(
    user: &User,
    date: NaiveDate,
    status: AttendanceStatus,
    sales: f64,
) -> AttendanceRecord {
    AttendanceRecord {
        id: AttendanceId::new(),
        organization_id: user.organization_id.unwrap_or_default(),
        user_id: user.id,
        date,
        status,
        work_hours: status.default_work_hours(),
        sales_amount: sales,
        check_in: None,
        check_out: None,
        notes: None,
        marked_by: None,
        created_at: Utc::now(),
    }
}

/// Shorthand for a calendar date
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
