//! Product business logic - creation, lookup and stock management.
//!
//! Products carry their own invariants (non-empty title, non-negative price and
//! stock) which are checked by the domain factory before anything is stored.

use crate::{
    domain::{NewProduct, Product},
    errors::{Error, Result},
    repositories::products,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Creates a new product from validated input.
///
/// # Errors
/// Returns an error if:
/// - The title is blank, or the price or stock is negative
/// - The database insert fails
#[instrument(skip(db))]
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<Product> {
    let product = Product::create(new, Utc::now())?;
    let product = products::create(db, product).await?;
    info!(
        "Created product {} '{}' with stock {}",
        product.id(),
        product.title(),
        product.stock()
    );
    Ok(product)
}

/// Retrieves a product by its id.
///
/// # Errors
/// Returns `NotFound` if no product has this id.
pub async fn get_product(db: &DatabaseConnection, id: i64) -> Result<Product> {
    products::find_by_id(db, id)
        .await?
        .ok_or_else(|| Error::not_found("Product"))
}

/// Retrieves all products, newest first.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<Product>> {
    products::find_all(db).await
}

/// Replaces a product's stock level. A stock of zero marks the product out of stock.
///
/// # Errors
/// Returns an error if:
/// - The stock is negative
/// - The product does not exist
#[instrument(skip(db))]
pub async fn update_product_stock(db: &DatabaseConnection, id: i64, stock: i64) -> Result<Product> {
    if stock < 0 {
        return Err(Error::validation("Stock must be non-negative"));
    }
    let product = products::update_stock(db, id, stock, Utc::now())
        .await?
        .ok_or_else(|| Error::not_found("Product"))?;
    info!(
        "Product {} stock set to {} ({})",
        product.id(),
        product.stock(),
        product.status()
    );
    Ok(product)
}
