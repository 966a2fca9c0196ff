//! Use cases - framework-agnostic operations exposed to the HTTP layer.
//!
//! Each function takes the shared [`sea_orm::DatabaseConnection`], reads the clock
//! once, delegates rules to [`crate::domain`] and persistence to
//! [`crate::repositories`].

/// Cart creation, lookup and content changes
pub mod cart;
/// Atomic cart-to-order checkout
pub mod checkout;
/// Coupon creation, administration and discount quotes
pub mod coupon;
/// Order creation and status transitions
pub mod order;
/// Payment creation and settlement
pub mod payment;
/// Product creation, lookup and stock updates
pub mod product;
