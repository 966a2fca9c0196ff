//! Product entity - Represents a sellable item with a price, a stock level and a sales window.
//!
//! The `status` column stores the domain `ProductStatus` name (`"Active"`, `"Inactive"`,
//! `"OutOfStock"`); rows are turned back into domain products by the product repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title, trimmed and non-empty
    pub title: String,
    /// Unit price in minor currency units
    pub price: i64,
    /// Units left in stock
    pub stock: i64,
    /// Start of the sales window
    pub begin_at: DateTimeUtc,
    /// End of the sales window
    pub end_at: DateTimeUtc,
    /// Sale status name
    pub status: String,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product can sit in many carts
    #[sea_orm(has_many = "super::cart::Entity")]
    Carts,
    /// A product can be ordered many times
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
