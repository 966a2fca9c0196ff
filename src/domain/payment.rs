//! Payment aggregate. Completion is a local status change; no gateway is involved.

use super::{Action, DomainError, Lifecycle, check_assignable, unknown_status};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            other => Err(unknown_status("payment", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    Complete,
    Fail,
    Refund,
}

impl Action for PaymentAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Refund => "refund",
        }
    }
}

impl Lifecycle for PaymentStatus {
    type Action = PaymentAction;

    const ENTITY: &'static str = "payment";

    fn next(self, action: PaymentAction) -> Option<Self> {
        match (self, action) {
            (Self::Pending, PaymentAction::Complete) => Some(Self::Completed),
            (Self::Pending, PaymentAction::Fail) => Some(Self::Failed),
            (Self::Completed, PaymentAction::Refund) => Some(Self::Refunded),
            (Self::Pending, PaymentAction::Refund)
            | (Self::Completed, PaymentAction::Complete | PaymentAction::Fail)
            | (Self::Failed | Self::Refunded, _) => None,
        }
    }

    fn action_for(target: Self) -> Option<PaymentAction> {
        match target {
            Self::Completed => Some(PaymentAction::Complete),
            Self::Failed => Some(PaymentAction::Fail),
            Self::Refunded => Some(PaymentAction::Refund),
            Self::Pending => None,
        }
    }
}

/// Input for [`Payment::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub order_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    id: i64,
    order_id: i64,
    paid_at: DateTime<Utc>,
    amount: i64,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Payment {
    /// Builds a Pending payment stamped with `now` as its payment time.
    pub fn create(new: NewPayment, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate(new.order_id, new.amount)?;
        Ok(Self {
            id: 0,
            order_id: new.order_id,
            paid_at: now,
            amount: new.amount,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn reconstitute(
        id: i64,
        new: NewPayment,
        paid_at: DateTime<Utc>,
        status: PaymentStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Invalid(format!("Invalid payment id: {id}")));
        }
        validate(new.order_id, new.amount)?;
        Ok(Self {
            id,
            order_id: new.order_id,
            paid_at,
            amount: new.amount,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn assign_id(self, id: i64) -> Result<Self, DomainError> {
        check_assignable("payment", self.id, id)?;
        Ok(Self { id, ..self })
    }

    pub fn complete(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.apply(PaymentAction::Complete, now)
    }

    pub fn fail(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.apply(PaymentAction::Fail, now)
    }

    pub fn refund(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.apply(PaymentAction::Refund, now)
    }

    pub fn apply(self, action: PaymentAction, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let status = self.status.apply(action)?;
        Ok(Self {
            status,
            updated_at: now,
            ..self
        })
    }

    pub fn transition_to(self, target: PaymentStatus, now: DateTime<Utc>) -> Result<Self, DomainError> {
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

    pub const fn order_id(&self) -> i64 {
        self.order_id
    }

    pub const fn paid_at(&self) -> DateTime<Utc> {
        self.paid_at
    }

    pub const fn amount(&self) -> i64 {
        self.amount
    }

    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate(order_id: i64, amount: i64) -> Result<(), DomainError> {
    if order_id <= 0 {
        return Err(DomainError::Invalid(format!("Invalid order id: {order_id}")));
    }
    if amount < 0 {
        return Err(DomainError::Invalid(
            "Amount must be non-negative".to_string(),
        ));
    }
    Ok(())
}
