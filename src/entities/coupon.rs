//! Coupon entity - Represents a discount code with a validity window.
//!
//! Carts and orders refer to coupons by id without a foreign key, so a coupon
//! can expire or be removed independently of anything that mentions it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coupon database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Redemption code, unique across coupons
    #[sea_orm(unique)]
    pub code: String,
    /// `"Percentage"` or `"Fixed"`
    pub discount_type: String,
    /// Percent (1..=100) or fixed amount in minor units
    pub discount_value: i64,
    /// Start of the validity window
    pub valid_from: DateTimeUtc,
    /// End of the validity window
    pub valid_until: DateTimeUtc,
    /// Status name, reconciled against the clock on read
    pub status: String,
    /// When the coupon was created
    pub created_at: DateTimeUtc,
    /// When the coupon was last modified
    pub updated_at: DateTimeUtc,
}

/// Coupons are referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
