//! Persistence adapters between domain aggregates and `SeaORM` rows.
//!
//! Every function is generic over [`sea_orm::ConnectionTrait`] so the same code runs
//! against the pooled connection or inside a transaction. Rows are turned back into
//! domain values through the aggregates' `reconstitute` invariants; coupon and cart
//! reads also reconcile status against the clock and persist any correction.

pub mod carts;
pub mod coupons;
pub mod orders;
pub mod payments;
pub mod products;

use crate::domain::DomainError;
use crate::errors::Error;

// A stored row that no longer satisfies the aggregate invariants is a storage fault.
pub(crate) fn corrupt_row(table: &str, id: i64, err: &DomainError) -> Error {
    Error::Database(sea_orm::DbErr::Custom(format!(
        "Invalid {table} row {id}: {err}"
    )))
}
