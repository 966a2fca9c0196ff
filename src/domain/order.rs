//! Order aggregate.

use super::{Action, DomainError, Lifecycle, check_assignable, unknown_status};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl OrderStatus {
    /// Stored and serialized representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            "Completed" => Ok(Self::Completed),
            other => Err(unknown_status("order", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Confirm,
    Cancel,
    Complete,
}

impl Action for OrderAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }
}

impl Lifecycle for OrderStatus {
    type Action = OrderAction;

    const ENTITY: &'static str = "order";

    fn next(self, action: OrderAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, OrderAction::Confirm) => Some(Self::Confirmed),
            (Self::Pending, OrderAction::Cancel) => Some(Self::Cancelled),
            (Self::Confirmed, OrderAction::Complete) => Some(Self::Completed),
            (Self::Pending, OrderAction::Complete)
            | (Self::Confirmed, OrderAction::Confirm | OrderAction::Cancel)
            | (Self::Cancelled | Self::Completed, _) => None,
        }
    }

    fn action_for(target: Self) -> Option<OrderAction> {
        match target {
            Self::Confirmed => Some(OrderAction::Confirm),
            Self::Cancelled => Some(OrderAction::Cancel),
            Self::Completed => Some(OrderAction::Complete),
            Self::Pending => None,
        }
    }
}

/// Input for [`Order::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub cart_id: i64,
    pub product_id: i64,
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    pub paid_amount: i64,
    pub discount_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: i64,
    cart_id: i64,
    product_id: i64,
    coupon_id: Option<i64>,
    quantity: i64,
    paid_amount: i64,
    discount_amount: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a Pending order.
    ///
    /// # Errors
    /// Non-positive references or quantity, negative amounts.
    pub fn create(new: NewOrder, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate(&new)?;
        Ok(Self::from_parts(0, new, OrderStatus::Pending, now, now))
    }

    pub fn reconstitute(
        id: i64,
        new: NewOrder,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Invalid(format!("Invalid order id: {id}")));
        }
        validate(&new)?;
        Ok(Self::from_parts(id, new, status, created_at, updated_at))
    }

    pub fn assign_id(self, id: i64) -> Result<Self, DomainError> {
        check_assignable("order", self.id, id)?;
        Ok(Self { id, ..self })
    }

    pub fn confirm(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.apply(OrderAction::Confirm, now)
    }

    pub fn cancel(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.apply(OrderAction::Cancel, now)
    }

    pub fn complete(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.apply(OrderAction::Complete, now)
    }

    /// Applies `action` through the transition table.
    pub fn apply(self, action: OrderAction, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let status = self.status.apply(action)?;
        Ok(Self {
            status,
            updated_at: now,
            ..self
        })
    }

    pub fn transition_to(self, target: OrderStatus, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let status = self.status.transition_to(target)?;
        Ok(Self {
            status,
            updated_at: now,
            ..self
        })
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn cart_id(&self) -> i64 {
        self.cart_id
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

    pub const fn paid_amount(&self) -> i64 {
        self.paid_amount
    }

    pub const fn discount_amount(&self) -> i64 {
        self.discount_amount
    }

    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    const fn from_parts(
        id: i64,
        new: NewOrder,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            cart_id: new.cart_id,
            product_id: new.product_id,
            coupon_id: new.coupon_id,
            quantity: new.quantity,
            paid_amount: new.paid_amount,
            discount_amount: new.discount_amount,
            status,
            created_at,
            updated_at,
        }
    }
}

/// `price * quantity`, rejecting non-positive quantities and overflow.
pub fn calculate_total_before_discount(price: i64, quantity: i64) -> Result<i64, DomainError> {
    if quantity <= 0 {
        return Err(DomainError::Rule(
            "Quantity must be greater than 0".to_string(),
        ));
    }
    price
        .checked_mul(quantity)
        .ok_or_else(|| DomainError::Rule("Order total is too large".to_string()))
}

fn validate(new: &NewOrder) -> Result<(), DomainError> {
    if new.cart_id <= 0 || new.product_id <= 0 || matches!(new.coupon_id, Some(id) if id <= 0) {
        return Err(DomainError::Invalid(
            "Order references must be positive ids".to_string(),
        ));
    }
    if new.quantity <= 0 {
        return Err(DomainError::Invalid(
            "Quantity must be greater than 0".to_string(),
        ));
    }
    if new.paid_amount < 0 || new.discount_amount < 0 {
        return Err(DomainError::Invalid(
            "Amounts must be non-negative".to_string(),
        ));
    }
    Ok(())
}
