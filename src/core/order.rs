//! Order business logic - direct creation, lookup and explicit status transitions.
//!
//! Orders normally come from [`crate::core::checkout::checkout_cart`]; `create_order`
//! exists for administrative entry and enforces the same one-order-per-cart rule.

use crate::{
    domain::{NewOrder, Order, OrderAction, OrderStatus, order::calculate_total_before_discount},
    errors::{Error, Result},
    repositories::{carts, orders, products},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Creates a Pending order for an existing cart and product.
///
/// # Errors
/// Returns an error if:
/// - Quantity, amounts or references are invalid
/// - The cart or product does not exist
/// - `discount_amount` exceeds `price * quantity`, or the amounts do not add up to it
/// - The cart already has an order (`Conflict`)
#[instrument(skip(db))]
pub async fn create_order(db: &DatabaseConnection, new: NewOrder) -> Result<Order> {
    let now = Utc::now();
    let order = Order::create(new, now)?;

    if carts::find_by_id(db, order.cart_id(), now).await?.is_none() {
        return Err(Error::not_found("Cart"));
    }
    let product = products::find_by_id(db, order.product_id())
        .await?
        .ok_or_else(|| Error::not_found("Product"))?;
    check_amounts(&order, product.price())?;
    if orders::find_by_cart_id(db, order.cart_id()).await?.is_some() {
        return Err(Error::conflict("Order already exists for this cart"));
    }

    let order = orders::create(db, order).await?;
    info!("Created order {} for cart {}", order.id(), order.cart_id());
    Ok(order)
}

/// Retrieves an order by its id.
///
/// # Errors
/// Returns `NotFound` if no order has this id.
pub async fn get_order(db: &DatabaseConnection, id: i64) -> Result<Order> {
    orders::find_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Order"))
}

/// Lists orders newest first, optionally only those in `status`.
pub async fn list_orders(db: &DatabaseConnection, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    match status {
        Some(status) => orders::find_by_status(db, status).await,
        None => orders::find_all(db).await,
    }
}

/// Pending -> Confirmed.
pub async fn confirm_order(db: &DatabaseConnection, id: i64) -> Result<Order> {
    transition(db, id, OrderAction::Confirm).await
}

/// Pending -> Cancelled.
pub async fn cancel_order(db: &DatabaseConnection, id: i64) -> Result<Order> {
    transition(db, id, OrderAction::Cancel).await
}

/// Confirmed -> Completed.
pub async fn complete_order(db: &DatabaseConnection, id: i64) -> Result<Order> {
    transition(db, id, OrderAction::Complete).await
}

// The amounts must split the undiscounted total exactly.
fn check_amounts(order: &Order, price: i64) -> Result<()> {
    let total = calculate_total_before_discount(price, order.quantity())?;
    if order.discount_amount() > total {
        return Err(Error::validation(format!(
            "Discount amount cannot exceed order total of {total}"
        )));
    }
    if order.paid_amount().checked_add(order.discount_amount()) != Some(total) {
        return Err(Error::validation(format!(
            "Paid and discount amounts must add up to order total of {total}"
        )));
    }
    Ok(())
}

#[instrument(skip(db))]
async fn transition(db: &DatabaseConnection, id: i64, action: OrderAction) -> Result<Order> {
    let order = get_order(db, id).await?.apply(action, Utc::now())?;
    let order = orders::save(db, &order).await?;
    info!("Order {} is now {}", order.id(), order.status());
    Ok(order)
}
