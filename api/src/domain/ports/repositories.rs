//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).
//!
//! Multi-row writes that touch stock (`BillRepository::create`,
//! `OrderRepository::place`, cancelling an order) are all-or-nothing:
//! either every row is written or none is.

use async_trait::async_trait;

use crate::domain::entities::{
    AttendanceFilter, AttendanceId, AttendanceRecord, AttendanceUpdate, Bill, BillFilter, BillId,
    BillWithItems, CartLine, NewAttendance, NewBill, NewOrder, NewOrganization, NewProduct,
    NewUser, Order, OrderId, OrderStatus, OrderWithItems, Organization, OrganizationId,
    OrganizationUpdate, Product, ProductFilter, ProductId, ProductUpdate, User, UserFilter, UserId,
    UserUpdate,
};
use crate::error::DomainError;

/// Repository for Organization entities
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Find an organization by ID
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, DomainError>;

    /// Find an organization by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, DomainError>;

    /// List organizations, newest first
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Organization>, DomainError>;

    /// Create a new organization
    async fn create(&self, org: &NewOrganization) -> Result<Organization, DomainError>;

    /// Apply a partial update
    async fn update(
        &self,
        id: &OrganizationId,
        update: &OrganizationUpdate,
    ) -> Result<Organization, DomainError>;
}

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// List users of an organization
    async fn list_by_org(
        &self,
        org_id: &OrganizationId,
        filter: &UserFilter,
    ) -> Result<Vec<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Apply a partial update
    async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<User, DomainError>;

    /// Replace the stored password hash
    async fn update_password(&self, id: &UserId, password_hash: &str) -> Result<(), DomainError>;
}

/// Repository for Product entities
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by ID
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// List products of an organization
    async fn list(
        &self,
        org_id: &OrganizationId,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, DomainError>;

    /// Create a new product
    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError>;

    /// Apply a partial update
    async fn update(&self, id: &ProductId, update: &ProductUpdate)
        -> Result<Product, DomainError>;

    /// Add `delta` to the stock level; fails if stock would go negative
    async fn adjust_stock(&self, id: &ProductId, delta: i32) -> Result<Product, DomainError>;
}

/// Repository for cart rows
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Cart rows of a user joined with their products
    async fn list(&self, user_id: &UserId) -> Result<Vec<CartLine>, DomainError>;

    /// Add `quantity` to the row for this product, creating it if needed
    async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<(), DomainError>;

    /// Set the row quantity; zero removes the row
    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<(), DomainError>;

    /// Remove one product from the cart
    async fn remove(&self, user_id: &UserId, product_id: &ProductId) -> Result<(), DomainError>;

    /// Remove every row of the cart
    async fn clear(&self, user_id: &UserId) -> Result<(), DomainError>;
}

/// Repository for Order entities
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Place an order: price lines, check and decrement stock, insert the
    /// order with its items and clear the buyer's cart, atomically
    async fn place(&self, order: &NewOrder) -> Result<OrderWithItems, DomainError>;

    /// Find an order with its items
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<OrderWithItems>, DomainError>;

    /// Orders placed by a user, newest first
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError>;

    /// Orders of an organization, newest first
    async fn list_by_org(
        &self,
        org_id: &OrganizationId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, DomainError>;

    /// Move an order to `status`; cancelling returns the items to stock
    async fn transition(&self, id: &OrderId, status: OrderStatus) -> Result<Order, DomainError>;
}

/// Repository for attendance records
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert or replace the record for the user and date
    async fn upsert(&self, record: &NewAttendance) -> Result<AttendanceRecord, DomainError>;

    /// Find a record by ID
    async fn find_by_id(&self, id: &AttendanceId)
        -> Result<Option<AttendanceRecord>, DomainError>;

    /// Records of a user within a date range, ordered by date
    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, DomainError>;

    /// Apply a partial update
    async fn update(
        &self,
        id: &AttendanceId,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, DomainError>;

    /// Delete a record
    async fn delete(&self, id: &AttendanceId) -> Result<(), DomainError>;
}

/// Repository for Bill entities
#[async_trait]
pub trait BillRepository: Send + Sync {
    /// Create a bill: price lines, check and decrement stock, compute
    /// totals and insert the bill with its items, atomically
    async fn create(&self, bill: &NewBill) -> Result<BillWithItems, DomainError>;

    /// Find a bill with its items
    async fn find_by_id(&self, id: &BillId) -> Result<Option<BillWithItems>, DomainError>;

    /// Bills of an organization, newest first
    async fn list(
        &self,
        org_id: &OrganizationId,
        filter: &BillFilter,
    ) -> Result<Vec<Bill>, DomainError>;

    /// Add a payment to the bill and recompute its payment state
    async fn record_payment(&self, id: &BillId, amount: f64) -> Result<Bill, DomainError>;
}
