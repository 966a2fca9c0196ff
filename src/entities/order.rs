//! Order entity - The result of a cart checkout, or of a direct order creation.
//!
//! `paid_amount` is the amount due after `discount_amount` has been taken off.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Cart the order was created from
    pub cart_id: i64,
    /// Product being ordered
    pub product_id: i64,
    /// Coupon applied at checkout, if any
    pub coupon_id: Option<i64>,
    /// Units ordered
    pub quantity: i64,
    /// Amount due after discount
    pub paid_amount: i64,
    /// Discount taken off the original amount
    pub discount_amount: i64,
    /// Fulfilment status name
    pub status: String,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order comes from one cart
    #[sea_orm(
        belongs_to = "super::cart::Entity",
        from = "Column::CartId",
        to = "super::cart::Column::Id"
    )]
    Cart,
    /// Each order is for one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// Payments recorded against the order
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
