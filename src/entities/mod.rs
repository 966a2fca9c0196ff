//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod payment;
pub mod product;

// Re-export specific types to avoid conflicts with the domain aggregates
pub use cart::{Column as CartColumn, Entity as CartEntity, Model as CartModel};
pub use coupon::{Column as CouponColumn, Entity as CouponEntity, Model as CouponModel};
pub use order::{Column as OrderColumn, Entity as OrderEntity, Model as OrderModel};
pub use payment::{Column as PaymentColumn, Entity as PaymentEntity, Model as PaymentModel};
pub use product::{Column as ProductColumn, Entity as ProductEntity, Model as ProductModel};
