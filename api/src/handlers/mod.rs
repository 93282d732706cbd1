//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod attendance;
pub mod auth;
pub mod bills;
pub mod cart;
pub mod orders;
pub mod organizations;
pub mod products;
pub mod salary;
pub mod users;

pub use attendance::{
    bulk_mark_attendance, delete_attendance, list_attendance, mark_attendance, update_attendance,
};
pub use auth::{change_password, login, me, register};
pub use bills::{bill_summary, create_bill, get_bill, list_bills, record_payment};
pub use cart::{add_to_cart, checkout, clear_cart, get_cart, remove_from_cart, set_cart_quantity};
pub use orders::{cancel_order, get_order, list_my_orders, list_org_orders, update_order_status};
pub use organizations::{
    create_organization, get_organization, list_organizations, update_organization,
};
pub use products::{
    adjust_stock, create_product, delete_product, get_product, list_products,
    storefront_products, update_product,
};
pub use salary::{get_salary, salary_report};
pub use users::{create_user, deactivate_user, get_user, list_users, update_user};
