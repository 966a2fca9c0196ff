//! Cart checkout - turns an Active cart into a Pending order in one transaction.
//!
//! The workflow loads the cart, its product and optional coupon, prices the
//! order, decrements stock, inserts the order and marks the cart checked out.
//! Every read and write goes through the same database transaction; any failure
//! rolls all of it back, including reconciliation writes made along the way.

use crate::{
    domain::{CartStatus, DomainError, NewOrder, Order, order::calculate_total_before_discount},
    errors::{Error, Result},
    repositories::{carts, coupons, orders, products},
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use tracing::{info, instrument, warn};

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutResult {
    /// The newly created Pending order
    pub order: Order,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// `price * quantity` before any discount
    pub original_amount: i64,
    pub discount_amount: i64,
    /// `original_amount - discount_amount`
    pub paid_amount: i64,
    /// Code of the applied coupon, if any
    pub coupon_code: Option<String>,
}

/// Checks out a cart atomically.
///
/// # Errors
/// Returns an error if:
/// - The cart, its product or its coupon does not exist (`NotFound`)
/// - The cart is not Active, the product is unavailable or the coupon is not redeemable
/// - Stock is insufficient at decrement time
/// - An order already exists for the cart (`Conflict`)
/// - A database operation fails
///
/// Nothing is written when an error is returned.
#[instrument(skip(db))]
pub async fn checkout_cart(db: &DatabaseConnection, cart_id: i64) -> Result<CheckoutResult> {
    let txn = db.begin().await?;

    match checkout_in(&txn, cart_id, Utc::now()).await {
        Ok(result) => {
            txn.commit().await?;
            info!(
                "Checked out cart {} into order {}: {} - {} = {}",
                result.cart_id,
                result.order.id(),
                result.original_amount,
                result.discount_amount,
                result.paid_amount
            );
            Ok(result)
        }
        Err(e) => Err(after_rollback(cart_id, e, txn.rollback().await)),
    }
}

// The checkout error is what the caller sees, whatever the rollback did.
fn after_rollback(cart_id: i64, err: Error, rollback: std::result::Result<(), DbErr>) -> Error {
    match rollback {
        Ok(()) => warn!("Checkout of cart {cart_id} rolled back: {err}"),
        Err(rollback) => {
            warn!("Checkout of cart {cart_id} failed ({err}) and rollback failed: {rollback}");
        }
    }
    err
}

async fn checkout_in<C: ConnectionTrait>(
    db: &C,
    cart_id: i64,
    now: DateTime<Utc>,
) -> Result<CheckoutResult> {
    let cart = carts::find_by_id(db, cart_id, now)
        .await?
        .ok_or_else(|| Error::not_found("Cart"))?;
    cart.can_checkout()?;

    let product = products::find_by_id(db, cart.product_id())
        .await?
        .ok_or_else(|| Error::not_found("Product"))?;
    if !product.is_available(now) {
        return Err(DomainError::Rule("Product is out of stock".to_string()).into());
    }

    let original_amount = calculate_total_before_discount(product.price(), cart.quantity())?;

    let (discount_amount, coupon_code) = match cart.coupon_id() {
        Some(coupon_id) => {
            let coupon = coupons::find_by_id(db, coupon_id, now)
                .await?
                .ok_or_else(|| Error::not_found("Coupon"))?;
            coupon.ensure_redeemable(now)?;
            (
                coupon.calculate_discount(original_amount),
                Some(coupon.code().to_string()),
            )
        }
        None => (0, None),
    };
    let paid_amount = original_amount - discount_amount;

    let product = product.decrease_stock(cart.quantity(), now)?;
    products::save(db, &product).await?;

    if orders::find_by_cart_id(db, cart.id()).await?.is_some() {
        return Err(Error::conflict("Order already exists for this cart"));
    }
    let order = Order::create(
        NewOrder {
            cart_id: cart.id(),
            product_id: product.id(),
            coupon_id: cart.coupon_id(),
            quantity: cart.quantity(),
            paid_amount,
            discount_amount,
        },
        now,
    )?;
    let order = orders::create(db, order).await?;

    let cart = carts::update_status(db, cart.id(), CartStatus::CheckedOut, now)
        .await?
        .ok_or_else(|| Error::not_found("Cart"))?;

    Ok(CheckoutResult {
        order,
        cart_id: cart.id(),
        product_id: product.id(),
        quantity: cart.quantity(),
        original_amount,
        discount_amount,
        paid_amount,
        coupon_code,
    })
}
