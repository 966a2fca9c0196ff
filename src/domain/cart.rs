//! Cart aggregate.

use super::{Action, DomainError, Lifecycle, check_assignable, unknown_status};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

/// Status of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartStatus {
    /// Open for changes and checkout
    Active,
    /// Passed `expired_at` before checkout
    Expired,
    /// Turned into an order
    CheckedOut,
}

impl CartStatus {
    /// Stored and serialized representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::CheckedOut => "CheckedOut",
        }
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Expired" => Ok(Self::Expired),
            "CheckedOut" => Ok(Self::CheckedOut),
            other => Err(unknown_status("cart", other)),
        }
    }
}

/// Transitions a cart can go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Checkout,
    Expire,
}

impl Action for CartAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Expire => "expire",
        }
    }
}

impl Lifecycle for CartStatus {
    type Action = CartAction;

    const ENTITY: &'static str = "cart";

    fn next(self, action: CartAction) -> Option<Self> {
        match (self, action) {
            (Self::Active, CartAction::Checkout) => Some(Self::CheckedOut),
            (Self::Active | Self::Expired, CartAction::Expire) => Some(Self::Expired),
            (Self::Expired | Self::CheckedOut, CartAction::Checkout)
            | (Self::CheckedOut, CartAction::Expire) => None,
        }
    }

    fn action_for(target: Self) -> Option<CartAction> {
        match target {
            Self::CheckedOut => Some(CartAction::Checkout),
            Self::Expired => Some(CartAction::Expire),
            Self::Active => None,
        }
    }
}

/// Input for [`Cart::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCart {
    pub product_id: i64,
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    pub expired_at: DateTime<Utc>,
    pub keep_until: DateTime<Utc>,
}

/// A single-product cart, optionally carrying a coupon reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    id: i64,
    product_id: i64,
    coupon_id: Option<i64>,
    quantity: i64,
    expired_at: DateTime<Utc>,
    keep_until: DateTime<Utc>,
    status: CartStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Builds a new Active cart.
    ///
    /// # Errors
    /// Non-positive product id or quantity.
    pub fn create(new: NewCart, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate(&new)?;
        Ok(Self {
            id: 0,
            product_id: new.product_id,
            coupon_id: new.coupon_id,
            quantity: new.quantity,
            expired_at: new.expired_at,
            keep_until: new.keep_until,
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn reconstitute(
        id: i64,
        new: NewCart,
        status: CartStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Invalid(format!("Invalid cart id: {id}")));
        }
        validate(&new)?;
        Ok(Self {
            id,
            product_id: new.product_id,
            coupon_id: new.coupon_id,
            quantity: new.quantity,
            expired_at: new.expired_at,
            keep_until: new.keep_until,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn assign_id(self, id: i64) -> Result<Self, DomainError> {
        check_assignable("cart", self.id, id)?;
        Ok(Self { id, ..self })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expired_at
    }

    /// Checks that [`Cart::checkout`] would succeed without consuming the cart.
    pub fn can_checkout(&self) -> Result<(), DomainError> {
        self.status.apply(CartAction::Checkout).map(|_| ())
    }

    /// Active -> CheckedOut.
    pub fn checkout(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.transition(CartAction::Checkout, now)
    }

    /// Active -> Expired; a no-op on an already Expired cart.
    pub fn mark_as_expired(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.status == CartStatus::Expired {
            return Ok(self);
        }
        self.transition(CartAction::Expire, now)
    }

    /// Moves to `target` through the transition table.
    pub fn transition_to(self, target: CartStatus, now: DateTime<Utc>) -> Result<Self, DomainError> {
        match CartStatus::action_for(target) {
            Some(CartAction::Expire) => self.mark_as_expired(now),
            _ => {
                let status = self.status.transition_to(target)?;
                Ok(self.with_status(status, now))
            }
        }
    }

    /// Expires an Active cart whose `expired_at` has passed.
    pub fn reconcile(self, now: DateTime<Utc>) -> (Self, bool) {
        if self.status == CartStatus::Active && self.is_expired(now) {
            (self.with_status(CartStatus::Expired, now), true)
        } else {
            (self, false)
        }
    }

    pub fn update_quantity(self, quantity: i64, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_mutable("update quantity of")?;
        if quantity <= 0 {
            return Err(DomainError::Invalid(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            quantity,
            updated_at: now,
            ..self
        })
    }

    pub fn add_coupon(self, coupon_id: i64, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_mutable("add coupon to")?;
        if coupon_id <= 0 {
            return Err(DomainError::Invalid(format!("Invalid coupon id: {coupon_id}")));
        }
        Ok(Self {
            coupon_id: Some(coupon_id),
            updated_at: now,
            ..self
        })
    }

    pub fn remove_coupon(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_mutable("remove coupon from")?;
        Ok(Self {
            coupon_id: None,
            updated_at: now,
            ..self
        })
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn product_id(&self) -> i64 {
        self.product_id
    }

    pub const fn coupon_id(&self) -> Option<i64> {
        self.coupon_id
    }

    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    pub const fn expired_at(&self) -> DateTime<Utc> {
        self.expired_at
    }

    pub const fn keep_until(&self) -> DateTime<Utc> {
        self.keep_until
    }

    pub const fn status(&self) -> CartStatus {
        self.status
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn transition(self, action: CartAction, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let status = self.status.apply(action)?;
        Ok(self.with_status(status, now))
    }

    fn with_status(self, status: CartStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            ..self
        }
    }

    fn ensure_mutable(&self, what: &str) -> Result<(), DomainError> {
        if self.status == CartStatus::Active {
            Ok(())
        } else {
            Err(DomainError::Rule(format!(
                "Cannot {what} {} cart",
                self.status.as_str().to_lowercase()
            )))
        }
    }
}

fn validate(new: &NewCart) -> Result<(), DomainError> {
    if new.product_id <= 0 {
        return Err(DomainError::Invalid(format!(
            "Invalid product id: {}",
            new.product_id
        )));
    }
    if new.quantity <= 0 {
        return Err(DomainError::Invalid(
            "Quantity must be greater than 0".to_string(),
        ));
    }
    if matches!(new.coupon_id, Some(id) if id <= 0) {
        return Err(DomainError::Invalid("Invalid coupon id".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn cart() -> Cart {
        Cart::create(
            NewCart {
                product_id: 1,
                coupon_id: None,
                quantity: 2,
                expired_at: now() + Duration::minutes(30),
                keep_until: now() + Duration::hours(24),
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_requires_positive_quantity() {
        let result = Cart::create(
            NewCart {
                product_id: 1,
                coupon_id: None,
                quantity: 0,
                expired_at: now(),
                keep_until: now(),
            },
            now(),
        );
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_checkout_is_terminal() {
        let cart = cart().checkout(now()).unwrap();
        assert_eq!(cart.status(), CartStatus::CheckedOut);

        let err = cart.clone().checkout(now()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot checkout checkedout cart");
        assert!(cart.clone().mark_as_expired(now()).is_err());
        assert!(cart.update_quantity(1, now()).is_err());
    }

    #[test]
    fn test_reconcile_expires_active_cart() {
        let cart = cart();
        let (same, changed) = cart.clone().reconcile(now());
        assert!(!changed);
        assert_eq!(same.status(), CartStatus::Active);

        let later = now() + Duration::hours(1);
        let (expired, changed) = cart.reconcile(later);
        assert!(changed);
        assert_eq!(expired.status(), CartStatus::Expired);
        assert_eq!(expired.updated_at(), later);

        let (expired, changed) = expired.reconcile(later + Duration::hours(1));
        assert!(!changed);
        assert!(expired.can_checkout().is_err());
    }

    #[test]
    fn test_mark_as_expired_is_idempotent() {
        let expired = cart().mark_as_expired(now()).unwrap();
        let again = expired.clone().mark_as_expired(now() + Duration::minutes(5)).unwrap();
        assert_eq!(expired, again);
    }

    #[test]
    fn test_transition_to_dispatches_by_target() {
        let cart = cart();
        let checked_out = cart.clone().transition_to(CartStatus::CheckedOut, now()).unwrap();
        assert_eq!(checked_out.status(), CartStatus::CheckedOut);
        assert!(cart.transition_to(CartStatus::Active, now()).is_err());
    }

    #[test]
    fn test_coupon_mutations_require_active_cart() {
        let cart = cart().add_coupon(4, now()).unwrap();
        assert_eq!(cart.coupon_id(), Some(4));
        let cart = cart.remove_coupon(now()).unwrap();
        assert_eq!(cart.coupon_id(), None);

        let expired = cart.mark_as_expired(now()).unwrap();
        let err = expired.add_coupon(4, now()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot add coupon to expired cart");
    }
}
