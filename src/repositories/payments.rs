//! Payment repository.

use super::corrupt_row;
use crate::domain::{NewPayment, Payment, PaymentStatus};
use crate::entities::{PaymentColumn, PaymentEntity, payment};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

fn to_domain(model: payment::Model) -> Result<Payment> {
    let id = model.id;
    let status = model
        .status
        .parse::<PaymentStatus>()
        .map_err(|e| corrupt_row("payments", id, &e))?;

    Payment::reconstitute(
        model.id,
        NewPayment {
            order_id: model.order_id,
            amount: model.amount,
        },
        model.paid_at,
        status,
        model.created_at,
        model.updated_at,
    )
    .map_err(|e| corrupt_row("payments", id, &e))
}

fn to_active_model(payment: &Payment) -> payment::ActiveModel {
    payment::ActiveModel {
        id: if payment.id() == 0 {
            NotSet
        } else {
            Unchanged(payment.id())
        },
        order_id: Set(payment.order_id()),
        paid_at: Set(payment.paid_at()),
        amount: Set(payment.amount()),
        status: Set(payment.status().as_str().to_string()),
        created_at: Set(payment.created_at()),
        updated_at: Set(payment.updated_at()),
    }
}

/// Inserts a new payment and returns it with its assigned id.
pub async fn create<C: ConnectionTrait>(db: &C, payment: Payment) -> Result<Payment> {
    let model = to_active_model(&payment).insert(db).await?;
    Ok(payment.assign_id(model.id)?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Payment>> {
    PaymentEntity::find_by_id(id)
        .one(db)
        .await?
        .map(to_domain)
        .transpose()
}

/// The payment recorded for `order_id`, if any.
pub async fn find_by_order_id<C: ConnectionTrait>(
    db: &C,
    order_id: i64,
) -> Result<Option<Payment>> {
    PaymentEntity::find()
        .filter(PaymentColumn::OrderId.eq(order_id))
        .one(db)
        .await?
        .map(to_domain)
        .transpose()
}

/// All payments, newest first.
pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Payment>> {
    PaymentEntity::find()
        .order_by_desc(PaymentColumn::CreatedAt)
        .order_by_desc(PaymentColumn::Id)
        .all(db)
        .await?
        .into_iter()
        .map(to_domain)
        .collect()
}

pub async fn find_by_status<C: ConnectionTrait>(
    db: &C,
    status: PaymentStatus,
) -> Result<Vec<Payment>> {
    PaymentEntity::find()
        .filter(PaymentColumn::Status.eq(status.as_str()))
        .order_by_desc(PaymentColumn::CreatedAt)
        .order_by_desc(PaymentColumn::Id)
        .all(db)
        .await?
        .into_iter()
        .map(to_domain)
        .collect()
}

/// Moves the payment to `status` through the payment transition table.
pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: i64,
    status: PaymentStatus,
    now: DateTime<Utc>,
) -> Result<Option<Payment>> {
    let Some(payment) = find_by_id(db, id).await? else {
        return Ok(None);
    };
    let updated = payment.transition_to(status, now)?;
    save(db, &updated).await.map(Some)
}

pub async fn save<C: ConnectionTrait>(db: &C, payment: &Payment) -> Result<Payment> {
    if payment.id() == 0 {
        return Err(Error::validation("Cannot update a payment that was never stored"));
    }
    let model = to_active_model(payment).update(db).await?;
    to_domain(model)
}
