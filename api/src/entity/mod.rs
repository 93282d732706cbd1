//! SeaORM table models
//!
//! One module per table in `migrations/0001_init.sql`.

pub mod attendance;
pub mod bill_items;
pub mod bills;
pub mod cart_items;
pub mod order_items;
pub mod orders;
pub mod organizations;
pub mod products;
pub mod users;
