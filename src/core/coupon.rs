//! Coupon business logic - creation, lookup, administration and discount quotes.

use crate::{
    domain::{Coupon, CouponStatus, DiscountType, NewCoupon},
    errors::{Error, Result},
    repositories::coupons,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, SqlErr};
use serde::Serialize;
use tracing::{info, instrument};

/// Price breakdown returned by [`calculate_discount`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountCalculation {
    pub original_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
    pub coupon_code: String,
}

/// Creates a new coupon with a unique code.
///
/// # Errors
/// Returns an error if:
/// - The code is blank or the discount value is not positive
/// - A percentage discount exceeds 100
/// - Another coupon already uses the code (`Conflict`)
#[instrument(skip(db))]
pub async fn create_coupon(db: &DatabaseConnection, new: NewCoupon) -> Result<Coupon> {
    if new.code.trim().is_empty() || new.discount_type.value() <= 0 {
        return Err(Error::validation(
            "Invalid request: code is required, discount_value must be positive",
        ));
    }
    if matches!(new.discount_type, DiscountType::Percentage(p) if p > 100) {
        return Err(Error::validation("Percentage discount cannot exceed 100"));
    }

    let now = Utc::now();
    if coupons::find_by_code(db, &new.code, now).await?.is_some() {
        return Err(Error::conflict("Coupon code already exists"));
    }

    // A concurrent insert of the same code still lands on the unique index.
    let coupon = coupons::create(db, Coupon::create(new, now)?)
        .await
        .map_err(duplicate_code)?;
    info!(
        "Created coupon {} ({} {}) status {}",
        coupon.code(),
        coupon.discount_type().kind(),
        coupon.discount_type().value(),
        coupon.status()
    );
    Ok(coupon)
}

/// Retrieves a coupon by code, with its status reconciled against the clock.
///
/// # Errors
/// Returns `NotFound` if no coupon has this code.
pub async fn get_coupon_by_code(db: &DatabaseConnection, code: &str) -> Result<Coupon> {
    coupons::find_by_code(db, code, Utc::now())
        .await?
        .ok_or_else(|| Error::not_found("Coupon"))
}

pub async fn list_coupons(db: &DatabaseConnection) -> Result<Vec<Coupon>> {
    coupons::find_all(db, Utc::now()).await
}

pub async fn list_active_coupons(db: &DatabaseConnection) -> Result<Vec<Coupon>> {
    coupons::find_active(db, Utc::now()).await
}

/// Administratively switches a coupon's status.
///
/// A deactivation inside the validity window is kept on later reads; outside the
/// window the clock takes over again.
#[instrument(skip(db))]
pub async fn change_coupon_status(
    db: &DatabaseConnection,
    code: &str,
    status: CouponStatus,
) -> Result<Coupon> {
    let now = Utc::now();
    let coupon = get_coupon_by_code(db, code).await?;
    let coupon = coupons::update_status(db, coupon.id(), status, now)
        .await?
        .ok_or_else(|| Error::not_found("Coupon"))?;
    info!("Coupon {} status changed to {}", coupon.code(), coupon.status());
    Ok(coupon)
}

/// Quotes the discount a coupon would grant on `original_price`.
///
/// # Errors
/// Returns an error if:
/// - The price is negative
/// - The coupon does not exist
/// - The coupon is not Active or outside its validity window
pub async fn calculate_discount(
    db: &DatabaseConnection,
    code: &str,
    original_price: i64,
) -> Result<DiscountCalculation> {
    if original_price < 0 {
        return Err(Error::validation("Invalid original_price"));
    }

    let now = Utc::now();
    let coupon = get_coupon_by_code(db, code).await?;
    require_redeemable(&coupon, now)?;

    let discount_amount = coupon.calculate_discount(original_price);
    Ok(DiscountCalculation {
        original_price,
        discount_amount,
        final_price: original_price - discount_amount,
        coupon_code: coupon.code().to_string(),
    })
}

fn duplicate_code(err: Error) -> Error {
    let unique_violation = matches!(
        &err,
        Error::Database(db_err)
            if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    );
    if unique_violation {
        Error::conflict("Coupon code already exists")
    } else {
        err
    }
}

/// Redeemability check for request-level flows, reported as a validation failure.
pub(crate) fn require_redeemable(coupon: &Coupon, now: DateTime<Utc>) -> Result<()> {
    coupon
        .ensure_redeemable(now)
        .map_err(|e| Error::validation(e.to_string()))
}
