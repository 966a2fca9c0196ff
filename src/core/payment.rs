//! Payment business logic. Payments are recorded against Confirmed orders and
//! settled locally; completing a payment also completes its order.

use crate::{
    domain::{NewPayment, OrderStatus, Payment, PaymentAction, PaymentStatus},
    errors::{Error, Result},
    repositories::{orders, payments},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

/// Records a Pending payment for a Confirmed order.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist or is not Confirmed
/// - The order already has a payment (`Conflict`)
/// - The amount is negative
#[instrument(skip(db))]
pub async fn create_payment(db: &DatabaseConnection, new: NewPayment) -> Result<Payment> {
    let txn = db.begin().await?;

    let order = orders::find_by_id(&txn, new.order_id)
        .await?
        .ok_or_else(|| Error::not_found("Order"))?;
    if order.status() != OrderStatus::Confirmed {
        return Err(Error::validation(format!(
            "Cannot create payment for {} order",
            order.status().as_str().to_lowercase()
        )));
    }
    if payments::find_by_order_id(&txn, order.id()).await?.is_some() {
        return Err(Error::conflict("Payment already exists for this order"));
    }

    let payment = payments::create(&txn, Payment::create(new, Utc::now())?).await?;
    txn.commit().await?;

    info!(
        "Created payment {} for order {} amount {}",
        payment.id(),
        payment.order_id(),
        payment.amount()
    );
    Ok(payment)
}

/// Retrieves a payment by its id.
///
/// # Errors
/// Returns `NotFound` if no payment has this id.
pub async fn get_payment(db: &DatabaseConnection, id: i64) -> Result<Payment> {
    payments::find_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Payment"))
}

/// Lists payments newest first, optionally only those in `status`.
pub async fn list_payments(
    db: &DatabaseConnection,
    status: Option<PaymentStatus>,
) -> Result<Vec<Payment>> {
    match status {
        Some(status) => payments::find_by_status(db, status).await,
        None => payments::find_all(db).await,
    }
}

/// Pending -> Completed, then tries to complete the order.
///
/// A failure to complete the order is logged and does not undo the payment.
#[instrument(skip(db))]
pub async fn complete_payment(db: &DatabaseConnection, id: i64) -> Result<Payment> {
    let payment = transition(db, id, PaymentAction::Complete).await?;

    let txn = db.begin().await?;
    match complete_order_for(&txn, &payment).await {
        Ok(()) => txn.commit().await?,
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                warn!("Rollback after order completion failure failed: {rollback}");
            }
            warn!(
                "Payment {} completed but order {} was not: {e}",
                payment.id(),
                payment.order_id()
            );
        }
    }
    Ok(payment)
}

/// Pending -> Failed.
pub async fn fail_payment(db: &DatabaseConnection, id: i64) -> Result<Payment> {
    transition(db, id, PaymentAction::Fail).await
}

/// Completed -> Refunded.
pub async fn refund_payment(db: &DatabaseConnection, id: i64) -> Result<Payment> {
    transition(db, id, PaymentAction::Refund).await
}

async fn transition(db: &DatabaseConnection, id: i64, action: PaymentAction) -> Result<Payment> {
    let payment = get_payment(db, id).await?.apply(action, Utc::now())?;
    let payment = payments::save(db, &payment).await?;
    info!("Payment {} is now {}", payment.id(), payment.status());
    Ok(payment)
}

async fn complete_order_for<C: ConnectionTrait>(db: &C, payment: &Payment) -> Result<()> {
    let order = orders::update_status(db, payment.order_id(), OrderStatus::Completed, Utc::now())
        .await?
        .ok_or_else(|| Error::not_found("Order"))?;
    info!("Order {} completed by payment {}", order.id(), payment.id());
    Ok(())
}
