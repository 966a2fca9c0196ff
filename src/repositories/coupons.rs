//! Coupon repository. Reads reconcile the stored status against the clock.

use super::corrupt_row;
use crate::domain::{Coupon, CouponStatus, DiscountType, NewCoupon};
use crate::entities::{CouponColumn, CouponEntity, coupon};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

fn to_domain(model: coupon::Model) -> Result<Coupon> {
    let id = model.id;
    let invalid = |e| corrupt_row("coupons", id, &e);

    let status = model.status.parse::<CouponStatus>().map_err(invalid)?;
    let discount_type =
        DiscountType::from_parts(&model.discount_type, model.discount_value).map_err(invalid)?;

    Coupon::reconstitute(
        model.id,
        NewCoupon {
            code: model.code,
            discount_type,
            valid_from: model.valid_from,
            valid_until: model.valid_until,
        },
        status,
        model.created_at,
        model.updated_at,
    )
    .map_err(invalid)
}

fn to_active_model(coupon: &Coupon) -> coupon::ActiveModel {
    coupon::ActiveModel {
        id: if coupon.id() == 0 {
            NotSet
        } else {
            Unchanged(coupon.id())
        },
        code: Set(coupon.code().to_string()),
        discount_type: Set(coupon.discount_type().kind().to_string()),
        discount_value: Set(coupon.discount_type().value()),
        valid_from: Set(coupon.valid_from()),
        valid_until: Set(coupon.valid_until()),
        status: Set(coupon.status().as_str().to_string()),
        created_at: Set(coupon.created_at()),
        updated_at: Set(coupon.updated_at()),
    }
}

// Applies time-based reconciliation and writes the correction back.
async fn reconciled<C: ConnectionTrait>(
    db: &C,
    model: coupon::Model,
    now: DateTime<Utc>,
) -> Result<Coupon> {
    let (coupon, changed) = to_domain(model)?.reconcile(now);
    if changed {
        debug!(
            "Coupon {} reconciled to {}",
            coupon.code(),
            coupon.status()
        );
        return save(db, &coupon).await;
    }
    Ok(coupon)
}

async fn reconcile_all<C: ConnectionTrait>(
    db: &C,
    models: Vec<coupon::Model>,
    now: DateTime<Utc>,
) -> Result<Vec<Coupon>> {
    let mut coupons = Vec::with_capacity(models.len());
    for model in models {
        coupons.push(reconciled(db, model, now).await?);
    }
    Ok(coupons)
}

/// Inserts a new coupon and returns it with its assigned id.
pub async fn create<C: ConnectionTrait>(db: &C, coupon: Coupon) -> Result<Coupon> {
    let model = to_active_model(&coupon).insert(db).await?;
    Ok(coupon.assign_id(model.id)?)
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Coupon>> {
    match CouponEntity::find_by_id(id).one(db).await? {
        Some(model) => reconciled(db, model, now).await.map(Some),
        None => Ok(None),
    }
}

pub async fn find_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
    now: DateTime<Utc>,
) -> Result<Option<Coupon>> {
    let model = CouponEntity::find()
        .filter(CouponColumn::Code.eq(code.trim()))
        .one(db)
        .await?;
    match model {
        Some(model) => reconciled(db, model, now).await.map(Some),
        None => Ok(None),
    }
}

/// All coupons, newest first.
pub async fn find_all<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<Vec<Coupon>> {
    let models = CouponEntity::find()
        .order_by_desc(CouponColumn::CreatedAt)
        .order_by_desc(CouponColumn::Id)
        .all(db)
        .await?;
    reconcile_all(db, models, now).await
}

/// Coupons that are Active after reconciliation.
pub async fn find_active<C: ConnectionTrait>(db: &C, now: DateTime<Utc>) -> Result<Vec<Coupon>> {
    Ok(find_all(db, now)
        .await?
        .into_iter()
        .filter(|coupon| coupon.status() == CouponStatus::Active)
        .collect())
}

/// Administrative status change; `None` when the coupon does not exist.
pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: i64,
    status: CouponStatus,
    now: DateTime<Utc>,
) -> Result<Option<Coupon>> {
    let Some(coupon) = find_by_id(db, id, now).await? else {
        return Ok(None);
    };
    let updated = coupon.change_status(status, now);
    save(db, &updated).await.map(Some)
}

pub async fn save<C: ConnectionTrait>(db: &C, coupon: &Coupon) -> Result<Coupon> {
    if coupon.id() == 0 {
        return Err(Error::validation("Cannot update a coupon that was never stored"));
    }
    let model = to_active_model(coupon).update(db).await?;
    to_domain(model)
}
