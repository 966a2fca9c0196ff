//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    domain::{Cart, Coupon, DiscountType, NewCart, NewCoupon, NewOrder, NewProduct, Order, Product},
    errors::Result,
    repositories::{carts, coupons, orders, products},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A sales/validity window wide enough to contain any test clock.
#[allow(clippy::unwrap_used)]
pub fn open_window() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap(),
    )
}

/// Product input on sale for the whole [`open_window`].
pub fn new_product(title: &str, price: i64, stock: i64) -> NewProduct {
    let (begin_at, end_at) = open_window();
    NewProduct {
        title: title.to_string(),
        price,
        stock,
        begin_at,
        end_at,
    }
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * title: "Test Product"
/// * sales window: [`open_window`]
pub async fn create_test_product(db: &DatabaseConnection, price: i64, stock: i64) -> Result<Product> {
    let product = Product::create(new_product("Test Product", price, stock), Utc::now())?;
    products::create(db, product).await
}

/// Creates a coupon valid for the whole [`open_window`].
pub async fn create_test_coupon(
    db: &DatabaseConnection,
    code: &str,
    discount_type: DiscountType,
) -> Result<Coupon> {
    let (valid_from, valid_until) = open_window();
    let coupon = Coupon::create(
        NewCoupon {
            code: code.to_string(),
            discount_type,
            valid_from,
            valid_until,
        },
        Utc::now(),
    )?;
    coupons::create(db, coupon).await
}

/// Creates an Active cart expiring 30 minutes from now.
pub async fn create_test_cart(
    db: &DatabaseConnection,
    product_id: i64,
    coupon_id: Option<i64>,
    quantity: i64,
) -> Result<Cart> {
    let now = Utc::now();
    let cart = Cart::create(
        NewCart {
            product_id,
            coupon_id,
            quantity,
            expired_at: now + Duration::minutes(30),
            keep_until: now + Duration::hours(24),
        },
        now,
    )?;
    carts::create(db, cart).await
}

/// Creates a product, a cart for two units of it, and a Pending order for that cart.
pub async fn create_test_order(db: &DatabaseConnection) -> Result<Order> {
    let product = create_test_product(db, 1_500, 10).await?;
    let cart = create_test_cart(db, product.id(), None, 2).await?;
    let order = Order::create(
        NewOrder {
            cart_id: cart.id(),
            product_id: product.id(),
            coupon_id: None,
            quantity: 2,
            paid_amount: 3_000,
            discount_amount: 0,
        },
        Utc::now(),
    )?;
    orders::create(db, order).await
}

/// Sets up a test database with a single product already created.
/// Returns (db, product) tuple.
pub async fn setup_with_product(price: i64, stock: i64) -> Result<(DatabaseConnection, Product)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, price, stock).await?;
    Ok((db, product))
}
