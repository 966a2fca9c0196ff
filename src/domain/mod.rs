//! Domain layer - pure entities, factories and status state machines.
//!
//! Nothing in this module touches storage or reads the clock. Every operation takes
//! the current time as an argument and returns a new entity value, leaving persistence
//! to the repositories and use cases that call it.

use std::fmt;
use thiserror::Error;

/// Cart aggregate and its expiry/checkout lifecycle
pub mod cart;
/// Coupon aggregate, discount types and discount calculation
pub mod coupon;
/// Order aggregate and its fulfilment lifecycle
pub mod order;
/// Payment aggregate and its settlement lifecycle
pub mod payment;
/// Product aggregate, stock handling and availability
pub mod product;

pub use cart::{Cart, CartAction, CartStatus, NewCart};
pub use coupon::{Coupon, CouponStatus, DiscountType, NewCoupon};
pub use order::{NewOrder, Order, OrderAction, OrderStatus};
pub use payment::{NewPayment, Payment, PaymentAction, PaymentStatus};
pub use product::{NewProduct, Product, ProductStatus};

/// Errors raised by domain factories and transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A value violates an entity invariant (empty title, negative price, bad range...).
    #[error("{0}")]
    Invalid(String),

    /// A stock decrement asked for more units than are available.
    #[error("Insufficient stock. Available: {available}")]
    InsufficientStock {
        /// Units requested by the caller
        requested: i64,
        /// Units currently in stock
        available: i64,
    },

    /// A status transition or business rule rejected the operation.
    #[error("{0}")]
    Rule(String),
}

impl DomainError {
    /// True for errors caused by malformed input rather than a rule violation.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::InsufficientStock { .. })
    }
}

/// An explicit, caller-requested transition such as `confirm` or `refund`.
pub trait Action: Copy + fmt::Debug {
    /// Verb used in rejection messages ("Cannot <verb> ...").
    fn verb(self) -> &'static str;
}

/// A closed status enum with a fixed allowed-transitions table.
///
/// `next` is the table itself; `apply` turns a missing entry into the
/// uniform "Cannot <verb> <status> <entity>" rejection.
pub trait Lifecycle: Copy + PartialEq + fmt::Display {
    /// The transitions callers may request.
    type Action: Action;

    /// Lower-case entity name used in rejection messages.
    const ENTITY: &'static str;

    /// Looks up the target status for `action`, or `None` if the table has no entry.
    fn next(self, action: Self::Action) -> Option<Self>;

    /// Maps a requested target status back to the action that reaches it.
    fn action_for(target: Self) -> Option<Self::Action>;

    /// Applies `action`, rejecting anything outside the table.
    fn apply(self, action: Self::Action) -> Result<Self, DomainError> {
        self.next(action).ok_or_else(|| {
            DomainError::Rule(format!(
                "Cannot {} {} {}",
                action.verb(),
                self.to_string().to_lowercase(),
                Self::ENTITY
            ))
        })
    }

    /// Moves to `target` through whichever action leads there.
    fn transition_to(self, target: Self) -> Result<Self, DomainError> {
        let action = Self::action_for(target).ok_or_else(|| {
            DomainError::Rule(format!(
                "Unsupported {} status transition to {target}",
                Self::ENTITY
            ))
        })?;
        self.apply(action)
    }
}

/// Rejects ids that were never assigned by storage, or reassignment of a persisted entity.
pub(crate) fn check_assignable(entity: &str, current: i64, id: i64) -> Result<(), DomainError> {
    if current != 0 {
        return Err(DomainError::Invalid(format!(
            "{entity} already has id {current}"
        )));
    }
    if id <= 0 {
        return Err(DomainError::Invalid(format!("Invalid {entity} id: {id}")));
    }
    Ok(())
}

/// Parses a stored status string, naming the entity on failure.
pub(crate) fn unknown_status(entity: &str, raw: &str) -> DomainError {
    DomainError::Invalid(format!("Unknown {entity} status: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(DomainError::Invalid("bad".to_string()).is_validation());
        assert!(
            DomainError::InsufficientStock {
                requested: 2,
                available: 1
            }
            .is_validation()
        );
        assert!(!DomainError::Rule("nope".to_string()).is_validation());
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = DomainError::InsufficientStock {
            requested: 5,
            available: 3,
        };
        assert_eq!(err.to_string(), "Insufficient stock. Available: 3");
    }

    #[test]
    fn test_check_assignable() {
        assert!(check_assignable("order", 0, 7).is_ok());
        assert!(check_assignable("order", 3, 7).is_err());
        assert!(check_assignable("order", 0, 0).is_err());
    }
}
