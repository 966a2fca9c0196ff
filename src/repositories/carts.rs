//! Cart repository. Reads expire Active carts whose `expired_at` has passed.

use super::corrupt_row;
use crate::domain::{Cart, CartStatus, NewCart};
use crate::entities::{CartColumn, CartEntity, cart};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder};
use tracing::debug;

fn to_domain(model: cart::Model) -> Result<Cart> {
    let id = model.id;
    let status = model
        .status
        .parse::<CartStatus>()
        .map_err(|e| corrupt_row("carts", id, &e))?;

    Cart::reconstitute(
        model.id,
        NewCart {
            product_id: model.product_id,
            coupon_id: model.coupon_id,
            quantity: model.quantity,
            expired_at: model.expired_at,
            keep_until: model.keep_until,
        },
        status,
        model.created_at,
        model.updated_at,
    )
    .map_err(|e| corrupt_row("carts", id, &e))
}

fn to_active_model(cart: &Cart) -> cart::ActiveModel {
    cart::ActiveModel {
        id: if cart.id() == 0 {
            NotSet
        } else {
            Unchanged(cart.id())
        },
        product_id: Set(cart.product_id()),
        coupon_id: Set(cart.coupon_id()),
        quantity: Set(cart.quantity()),
        expired_at: Set(cart.expired_at()),
        keep_until: Set(cart.keep_until()),
        status: Set(cart.status().as_str().to_string()),
        created_at: Set(cart.created_at()),
        updated_at: Set(cart.updated_at()),
    }
}

async fn reconciled<C: ConnectionTrait>(
    db: &C,
    model: cart::Model,
    now: DateTime<Utc>,
) -> Result<Cart> {
    let (cart, changed) = to_domain(model)?.reconcile(now);
    if changed {
        debug!("Cart {} expired on read", cart.id());
        return save(db, &cart).await;
    }
    Ok(cart)
}

/// Inserts a new cart and returns it with its assigned id.
pub async fn create<C: ConnectionTrait>(db: &C, cart: Cart) -> Result<Cart> {
    let model = to_active_model(&cart).insert(db).await?;
    Ok(cart.assign_id(model.id)?)
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Cart>> {
    match CartEntity::find_by_id(id).one(db).await? {
        Some(model) => reconciled(db, model, now).await.map(Some),
        None => Ok(None),
    }
}

/// All carts, newest first.
pub async fn find_all<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<Vec<Cart>> {
    let models = CartEntity::find()
        .order_by_desc(CartColumn::CreatedAt)
        .order_by_desc(CartColumn::Id)
        .all(db)
        .await?;

    let mut carts = Vec::with_capacity(models.len());
    for model in models {
        carts.push(reconciled(db, model, now).await?);
    }
    Ok(carts)
}

/// Carts still Active after expiry reconciliation.
pub async fn find_active<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<Vec<Cart>> {
    Ok(find_all(db, now)
        .await?
        .into_iter()
        .filter(|cart| cart.status() == CartStatus::Active)
        .collect())
}

pub async fn update_quantity<C: ConnectionTrait>(
    db: &C,
    id: i64,
    quantity: i64,
    now: DateTime<Utc>,
) -> Result<Option<Cart>> {
    let Some(cart) = find_by_id(db, id, now).await? else {
        return Ok(None);
    };
    let updated = cart.update_quantity(quantity, now)?;
    save(db, &updated).await.map(Some)
}

/// Sets or clears the coupon reference.
pub async fn update_coupon<C: ConnectionTrait>(
    db: &C,
    id: i64,
    coupon_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Option<Cart>> {
    let Some(cart) = find_by_id(db, id, now).await? else {
        return Ok(None);
    };
    let updated = match coupon_id {
        Some(coupon_id) => cart.add_coupon(coupon_id, now)?,
        None => cart.remove_coupon(now)?,
    };
    save(db, &updated).await.map(Some)
}

/// Moves the cart to `status` through the cart transition table.
pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: i64,
    status: CartStatus,
    now: DateTime<Utc>,
) -> Result<Option<Cart>> {
    let Some(cart) = find_by_id(db, id, now).await? else {
        return Ok(None);
    };
    let updated = cart.transition_to(status, now)?;
    save(db, &updated).await.map(Some)
}

pub async fn save<C: ConnectionTrait>(db: &C, cart: &Cart) -> Result<Cart> {
    if cart.id() == 0 {
        return Err(Error::validation("Cannot update a cart that was never stored"));
    }
    let model = to_active_model(cart).update(db).await?;
    to_domain(model)
}
