//! Coupon aggregate and discount calculation.
//!
//! A coupon's status follows its validity window: `Inactive` before `valid_from`,
//! `Active` inside the window and `Expired` after `valid_until`. Reads reconcile the
//! stored status against the clock; an explicit administrative change made inside
//! the window is kept until the window ends.

use super::{DomainError, check_assignable, unknown_status};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

/// Status of a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponStatus {
    /// Redeemable
    Active,
    /// Not yet valid, or switched off
    Inactive,
    /// Past its validity window
    Expired,
}

impl CouponStatus {
    /// Stored and serialized representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            "Expired" => Ok(Self::Expired),
            other => Err(unknown_status("coupon", other)),
        }
    }
}

/// How a coupon reduces a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    /// Percentage off, 1..=100
    Percentage(i64),
    /// Fixed amount off, in minor units
    Fixed(i64),
}

impl DiscountType {
    /// Builds a discount from its stored kind name and value.
    ///
    /// # Errors
    /// Unknown kind names and out-of-range values are rejected.
    pub fn from_parts(kind: &str, value: i64) -> Result<Self, DomainError> {
        let discount = match kind {
            "Percentage" => Self::Percentage(value),
            "Fixed" => Self::Fixed(value),
            other => {
                return Err(DomainError::Invalid(format!(
                    "Unknown discount type: {other}"
                )));
            }
        };
        discount.validate()?;
        Ok(discount)
    }

    pub const fn kind(self) -> &'static str {
        match self {
            Self::Percentage(_) => "Percentage",
            Self::Fixed(_) => "Fixed",
        }
    }

    pub const fn value(self) -> i64 {
        match self {
            Self::Percentage(value) | Self::Fixed(value) => value,
        }
    }

    /// Discount for `original_price`, truncated toward zero and never above the price.
    pub fn discount_for(self, original_price: i64) -> i64 {
        match self {
            Self::Percentage(percent) => {
                let amount = i128::from(original_price) * i128::from(percent) / 100;
                i64::try_from(amount).unwrap_or(original_price)
            }
            Self::Fixed(amount) => amount.min(original_price),
        }
    }

    fn validate(self) -> Result<(), DomainError> {
        match self {
            Self::Percentage(value) | Self::Fixed(value) if value <= 0 => {
                Err(DomainError::Invalid(
                    "Discount value must be greater than 0".to_string(),
                ))
            }
            Self::Percentage(value) if value > 100 => Err(DomainError::Invalid(
                "Percentage discount cannot exceed 100".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Input for [`Coupon::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    id: i64,
    code: String,
    discount_type: DiscountType,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    status: CouponStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Builds a new coupon whose status reflects `now` against its window.
    ///
    /// # Errors
    /// Blank code, out-of-range discount or an empty window.
    pub fn create(new: NewCoupon, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let code = new.code.trim().to_string();
        validate(&code, new.discount_type, new.valid_from, new.valid_until)?;

        Ok(Self {
            id: 0,
            code,
            discount_type: new.discount_type,
            valid_from: new.valid_from,
            valid_until: new.valid_until,
            status: status_for(new.valid_from, new.valid_until, now),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a stored coupon through the creation invariants.
    pub fn reconstitute(
        id: i64,
        new: NewCoupon,
        status: CouponStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Invalid(format!("Invalid coupon id: {id}")));
        }
        validate(&new.code, new.discount_type, new.valid_from, new.valid_until)?;

        Ok(Self {
            id,
            code: new.code,
            discount_type: new.discount_type,
            valid_from: new.valid_from,
            valid_until: new.valid_until,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn assign_id(self, id: i64) -> Result<Self, DomainError> {
        check_assignable("coupon", self.id, id)?;
        Ok(Self { id, ..self })
    }

    /// `now` lies inside the validity window, whatever the stored status says.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }

    /// Discount this coupon grants on `original_price`.
    pub fn calculate_discount(&self, original_price: i64) -> i64 {
        self.discount_type.discount_for(original_price)
    }

    /// Requires an Active coupon inside its window.
    ///
    /// # Errors
    /// [`DomainError::Rule`] "Coupon is <status>" otherwise.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status == CouponStatus::Active && self.is_valid(now) {
            return Ok(());
        }
        let status = if self.status == CouponStatus::Active {
            status_for(self.valid_from, self.valid_until, now)
        } else {
            self.status
        };
        Err(DomainError::Rule(format!(
            "Coupon is {}",
            status.as_str().to_lowercase()
        )))
    }

    /// Status the clock says this coupon should have.
    pub fn update_status_by_time(self, now: DateTime<Utc>) -> Self {
        let target = if now < self.valid_from {
            CouponStatus::Inactive
        } else if now > self.valid_until {
            CouponStatus::Expired
        } else if self.status != CouponStatus::Active && self.updated_at >= self.valid_from {
            self.status
        } else {
            CouponStatus::Active
        };

        if target == self.status {
            self
        } else {
            Self {
                status: target,
                updated_at: now,
                ..self
            }
        }
    }

    /// Time-reconciled coupon and whether it differs from the stored one.
    pub fn reconcile(self, now: DateTime<Utc>) -> (Self, bool) {
        let before = self.status;
        let coupon = self.update_status_by_time(now);
        let changed = coupon.status != before;
        (coupon, changed)
    }

    /// Administrative status override.
    pub fn change_status(self, status: CouponStatus, now: DateTime<Utc>) -> Self {
        if status == self.status {
            return self;
        }
        Self {
            status,
            updated_at: now,
            ..self
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub const fn discount_type(&self) -> DiscountType {
        self.discount_type
    }

    pub const fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub const fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    pub const fn status(&self) -> CouponStatus {
        self.status
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate(
    code: &str,
    discount_type: DiscountType,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> Result<(), DomainError> {
    if code.trim().is_empty() {
        return Err(DomainError::Invalid("Coupon code is required".to_string()));
    }
    discount_type.validate()?;
    if valid_from >= valid_until {
        return Err(DomainError::Invalid(
            "valid_from must be before valid_until".to_string(),
        ));
    }
    Ok(())
}

fn status_for(
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CouponStatus {
    if now < valid_from {
        CouponStatus::Inactive
    } else if now > valid_until {
        CouponStatus::Expired
    } else {
        CouponStatus::Active
    }
}
