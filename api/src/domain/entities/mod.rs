//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub mod attendance;
pub mod bill;
pub mod cart;
pub mod money;
pub mod order;
pub mod organization;
pub mod product;
pub mod salary;
pub mod user;

pub use attendance::{
    AttendanceFilter, AttendanceId, AttendanceRecord, AttendanceStatus, AttendanceUpdate,
    MonthRange, NewAttendance,
};
pub use bill::{
    Bill, BillAdjustments, BillFilter, BillId, BillItem, BillLine, BillSummary, BillTotals,
    BillWithItems, NewBill, PaymentState, PaymentStatus, PricedLine,
};
pub use cart::{CartItem, CartLine};
pub use money::round_money;
pub use order::{NewOrder, Order, OrderId, OrderItem, OrderLine, OrderStatus, OrderWithItems};
pub use organization::{slugify, NewOrganization, Organization, OrganizationId, OrganizationUpdate};
pub use product::{
    add_quantities, stock_bounds, NewProduct, Product, ProductFilter, ProductId, ProductUpdate,
};
pub use salary::{AttendanceSummary, DeductionPolicy, SalaryBreakdown, SalaryProfile};
pub use user::{AuthUser, NewUser, Role, User, UserFilter, UserId, UserUpdate};
