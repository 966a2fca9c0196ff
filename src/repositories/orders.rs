//! Order repository.

use super::corrupt_row;
use crate::domain::{NewOrder, Order, OrderStatus};
use crate::entities::{OrderColumn, OrderEntity, order};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

fn to_domain(model: order::Model) -> Result<Order> {
    let id = model.id;
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|e| corrupt_row("orders", id, &e))?;

    Order::reconstitute(
        model.id,
        NewOrder {
            cart_id: model.cart_id,
            product_id: model.product_id,
            coupon_id: model.coupon_id,
            quantity: model.quantity,
            paid_amount: model.paid_amount,
            discount_amount: model.discount_amount,
        },
        status,
        model.created_at,
        model.updated_at,
    )
    .map_err(|e| corrupt_row("orders", id, &e))
}

fn to_active_model(order: &Order) -> order::ActiveModel {
    order::ActiveModel {
        id: if order.id() == 0 {
            NotSet
        } else {
            Unchanged(order.id())
        },
        cart_id: Set(order.cart_id()),
        product_id: Set(order.product_id()),
        coupon_id: Set(order.coupon_id()),
        quantity: Set(order.quantity()),
        paid_amount: Set(order.paid_amount()),
        discount_amount: Set(order.discount_amount()),
        status: Set(order.status().as_str().to_string()),
        created_at: Set(order.created_at()),
        updated_at: Set(order.updated_at()),
    }
}

/// Inserts a new order and returns it with its assigned id.
pub async fn create<C: ConnectionTrait>(db: &C, order: Order) -> Result<Order> {
    let model = to_active_model(&order).insert(db).await?;
    Ok(order.assign_id(model.id)?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Order>> {
    OrderEntity::find_by_id(id)
        .one(db)
        .await?
        .map(to_domain)
        .transpose()
}

/// The order created from `cart_id`, if any.
pub async fn find_by_cart_id<C: ConnectionTrait>(db: &C, cart_id: i64) -> Result<Option<Order>> {
    OrderEntity::find()
        .filter(OrderColumn::CartId.eq(cart_id))
        .one(db)
        .await?
        .map(to_domain)
        .transpose()
}

/// All orders, newest first.
pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Order>> {
    OrderEntity::find()
        .order_by_desc(OrderColumn::CreatedAt)
        .order_by_desc(OrderColumn::Id)
        .all(db)
        .await?
        .into_iter()
        .map(to_domain)
        .collect()
}

pub async fn find_by_status<C: ConnectionTrait>(db: &C, status: OrderStatus) -> Result<Vec<Order>> {
    OrderEntity::find()
        .filter(OrderColumn::Status.eq(status.as_str()))
        .order_by_desc(OrderColumn::CreatedAt)
        .order_by_desc(OrderColumn::Id)
        .all(db)
        .await?
        .into_iter()
        .map(to_domain)
        .collect()
}

/// Moves the order to `status` through the order transition table.
pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: i64,
    status: OrderStatus,
    now: DateTime<Utc>,
) -> Result<Option<Order>> {
    let Some(order) = find_by_id(db, id).await? else {
        return Ok(None);
    };
    let updated = order.transition_to(status, now)?;
    save(db, &updated).await.map(Some)
}

pub async fn save<C: ConnectionTrait>(db: &C, order: &Order) -> Result<Order> {
    if order.id() == 0 {
        return Err(Error::validation("Cannot update an order that was never stored"));
    }
    let model = to_active_model(order).update(db).await?;
    to_domain(model)
}
