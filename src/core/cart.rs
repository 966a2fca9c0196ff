//! Cart business logic - creation, lookup and content changes before checkout.
//!
//! Checkout itself lives in [`crate::core::checkout`].

use crate::{
    config::settings::CartSettings,
    core::coupon::require_redeemable,
    domain::{Cart, NewCart},
    errors::{Error, Result},
    repositories::{carts, coupons, products},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{info, instrument};

/// Request to open a cart. Missing times fall back to the configured cart lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCart {
    pub product_id: i64,
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    pub expired_at: Option<DateTime<Utc>>,
    pub keep_until: Option<DateTime<Utc>>,
}

/// Opens a new Active cart for a single product.
///
/// # Errors
/// Returns an error if:
/// - The quantity is not positive
/// - The product does not exist or has fewer units than requested
/// - The coupon does not exist, is not Active or is outside its window
#[instrument(skip(db, defaults))]
pub async fn create_cart(
    db: &DatabaseConnection,
    request: CreateCart,
    defaults: &CartSettings,
) -> Result<Cart> {
    if request.quantity <= 0 {
        return Err(Error::validation("Quantity must be positive"));
    }

    let now = Utc::now();
    ensure_stock(db, request.product_id, request.quantity).await?;
    if let Some(coupon_id) = request.coupon_id {
        ensure_coupon(db, coupon_id, now).await?;
    }

    let cart = Cart::create(
        NewCart {
            product_id: request.product_id,
            coupon_id: request.coupon_id,
            quantity: request.quantity,
            expired_at: match request.expired_at {
                Some(at) => at,
                None => offset(now, defaults.expires_after()?)?,
            },
            keep_until: match request.keep_until {
                Some(at) => at,
                None => offset(now, defaults.keep_for()?)?,
            },
        },
        now,
    )?;
    let cart = carts::create(db, cart).await?;
    info!(
        "Created cart {} for product {} x{}",
        cart.id(),
        cart.product_id(),
        cart.quantity()
    );
    Ok(cart)
}

/// Retrieves a cart by id, expiring it first if its time has passed.
///
/// # Errors
/// Returns `NotFound` if no cart has this id.
pub async fn get_cart(db: &DatabaseConnection, id: i64) -> Result<Cart> {
    carts::find_by_id(db, id, Utc::now())
        .await?
        .ok_or_else(|| Error::not_found("Cart"))
}

pub async fn list_carts(db: &DatabaseConnection) -> Result<Vec<Cart>> {
    carts::find_all(db, Utc::now()).await
}

pub async fn list_active_carts(db: &DatabaseConnection) -> Result<Vec<Cart>> {
    carts::find_active(db, Utc::now()).await
}

/// Changes the quantity of an Active cart.
///
/// # Errors
/// Returns an error if:
/// - The quantity is not positive
/// - The cart or its product does not exist
/// - The product has fewer units than requested
/// - The cart is no longer Active
#[instrument(skip(db))]
pub async fn update_cart_quantity(db: &DatabaseConnection, id: i64, quantity: i64) -> Result<Cart> {
    if quantity <= 0 {
        return Err(Error::validation("Quantity must be positive"));
    }

    let now = Utc::now();
    let cart = get_cart(db, id).await?;
    ensure_stock(db, cart.product_id(), quantity).await?;

    let cart = carts::update_quantity(db, id, quantity, now)
        .await?
        .ok_or_else(|| Error::not_found("Cart"))?;
    info!("Cart {} quantity set to {}", cart.id(), cart.quantity());
    Ok(cart)
}

/// Attaches a coupon to an Active cart, or detaches it when `coupon_id` is `None`.
///
/// # Errors
/// Returns an error if:
/// - The cart or the coupon does not exist
/// - The coupon is not Active or is outside its window
/// - The cart is no longer Active
#[instrument(skip(db))]
pub async fn update_cart_coupon(
    db: &DatabaseConnection,
    id: i64,
    coupon_id: Option<i64>,
) -> Result<Cart> {
    let now = Utc::now();
    get_cart(db, id).await?;
    if let Some(coupon_id) = coupon_id {
        ensure_coupon(db, coupon_id, now).await?;
    }

    let cart = carts::update_coupon(db, id, coupon_id, now)
        .await?
        .ok_or_else(|| Error::not_found("Cart"))?;
    info!("Cart {} coupon set to {:?}", cart.id(), cart.coupon_id());
    Ok(cart)
}

fn offset(now: DateTime<Utc>, lifetime: Duration) -> Result<DateTime<Utc>> {
    now.checked_add_signed(lifetime).ok_or_else(|| Error::Config {
        message: "Cart lifetime is out of range".to_string(),
    })
}

async fn ensure_stock<C: ConnectionTrait>(db: &C, product_id: i64, quantity: i64) -> Result<()> {
    let product = products::find_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::not_found("Product"))?;
    if product.stock() < quantity {
        return Err(Error::validation(format!(
            "Insufficient stock. Available: {}",
            product.stock()
        )));
    }
    Ok(())
}

async fn ensure_coupon<C: ConnectionTrait>(db: &C, coupon_id: i64, now: DateTime<Utc>) -> Result<()> {
    let coupon = coupons::find_by_id(db, coupon_id, now)
        .await?
        .ok_or_else(|| Error::not_found("Coupon"))?;
    require_redeemable(&coupon, now)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::domain::{CartStatus, CouponStatus, DiscountType};
    use crate::errors::ErrorKind;
    use crate::repositories::coupons as coupon_repo;
    use crate::test_utils::{create_test_coupon, create_test_product, setup_test_db, setup_with_product};

    fn request(product_id: i64, quantity: i64) -> CreateCart {
        CreateCart {
            product_id,
            coupon_id: None,
            quantity,
            expired_at: None,
            keep_until: None,
        }
    }

    #[tokio::test]
    async fn test_create_cart_applies_default_lifetime() -> Result<()> {
        let (db, product) = setup_with_product(2_000, 5).await?;
        let before = Utc::now();
        let cart = create_cart(&db, request(product.id(), 2), &CartSettings::default()).await?;

        assert_eq!(cart.status(), CartStatus::Active);
        assert!(cart.expired_at() >= before + Duration::minutes(30));
        assert!(cart.expired_at() <= Utc::now() + Duration::minutes(30));
        assert!(cart.keep_until() >= before + Duration::hours(24));
        Ok(())
    }

    #[tokio::test]
    async fn test_unrepresentable_lifetime_is_config_error() -> Result<()> {
        let (db, product) = setup_with_product(2_000, 5).await?;
        let defaults = CartSettings {
            expires_after_minutes: 100_000_000_000_000,
            keep_for_hours: 24,
        };

        let err = create_cart(&db, request(product.id(), 1), &defaults)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.kind(), Some(ErrorKind::Internal));
        assert!(list_carts(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_cart_checks_stock_and_product() -> Result<()> {
        let (db, product) = setup_with_product(2_000, 3).await?;

        let err = create_cart(&db, request(product.id(), 4), &CartSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock. Available: 3");
        assert_eq!(err.kind(), Some(ErrorKind::Validation));

        let err = create_cart(&db, request(999, 1), &CartSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product not found");

        let err = create_cart(&db, request(product.id(), 0), &CartSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_cart_rejects_inactive_coupon() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, 2_000, 3).await?;
        let coupon = create_test_coupon(&db, "PAUSED", DiscountType::Fixed(100)).await?;
        coupon_repo::update_status(&db, coupon.id(), CouponStatus::Inactive, Utc::now()).await?;

        let mut with_coupon = request(product.id(), 1);
        with_coupon.coupon_id = Some(coupon.id());
        let err = create_cart(&db, with_coupon.clone(), &CartSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Coupon is inactive");

        with_coupon.coupon_id = Some(coupon.id() + 100);
        let err = create_cart(&db, with_coupon, &CartSettings::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Coupon not found");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_and_coupon() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, 1_000, 4).await?;
        let coupon = create_test_coupon(&db, "FIVE", DiscountType::Percentage(5)).await?;
        let cart = create_cart(&db, request(product.id(), 1), &CartSettings::default()).await?;

        let cart = update_cart_quantity(&db, cart.id(), 4).await?;
        assert_eq!(cart.quantity(), 4);
        let err = update_cart_quantity(&db, cart.id(), 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock. Available: 4");

        let cart = update_cart_coupon(&db, cart.id(), Some(coupon.id())).await?;
        assert_eq!(cart.coupon_id(), Some(coupon.id()));
        let cart = update_cart_coupon(&db, cart.id(), None).await?;
        assert_eq!(cart.coupon_id(), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_cart_rejects_changes() -> Result<()> {
        let (db, product) = setup_with_product(1_000, 4).await?;
        let mut expiring = request(product.id(), 1);
        expiring.expired_at = Some(Utc::now() - Duration::minutes(1));
        let cart = create_cart(&db, expiring, &CartSettings::default()).await?;

        let fetched = get_cart(&db, cart.id()).await?;
        assert_eq!(fetched.status(), CartStatus::Expired);
        assert!(list_active_carts(&db).await?.is_empty());
        assert_eq!(list_carts(&db).await?.len(), 1);

        let err = update_cart_quantity(&db, cart.id(), 2).await.unwrap_err();
        assert!(matches!(err, Error::Domain(_)));
        Ok(())
    }
}
