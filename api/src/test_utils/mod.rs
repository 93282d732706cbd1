//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The in-memory repositories share one product table so that carts,
//! orders and bills see the same stock, and multi-row writes are
//! all-or-nothing like their PostgreSQL counterparts.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
