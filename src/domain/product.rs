//! Product aggregate.

use super::{DomainError, check_assignable, unknown_status};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

/// Sale status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    /// On sale
    Active,
    /// Withdrawn from sale
    Inactive,
    /// Stock has reached zero
    OutOfStock,
}

impl ProductStatus {
    /// Stored and serialized representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::OutOfStock => "OutOfStock",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            "OutOfStock" => Ok(Self::OutOfStock),
            other => Err(unknown_status("product", other)),
        }
    }
}

/// Input for [`Product::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub price: i64,
    pub stock: i64,
    pub begin_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// A product with a price, a stock level and a sales window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: i64,
    title: String,
    price: i64,
    stock: i64,
    begin_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a new, not yet persisted product.
    ///
    /// # Errors
    /// Returns [`DomainError::Invalid`] for a blank title or a negative price or stock.
    pub fn create(new: NewProduct, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let title = new.title.trim().to_string();
        validate(&title, new.price, new.stock)?;

        Ok(Self {
            id: 0,
            title,
            price: new.price,
            stock: new.stock,
            begin_at: new.begin_at,
            end_at: new.end_at,
            status: derive_status(new.stock, ProductStatus::Active),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a product from stored values, re-running the creation invariants.
    ///
    /// # Errors
    /// Returns [`DomainError::Invalid`] when the stored row is inconsistent.
    pub fn reconstitute(
        id: i64,
        new: NewProduct,
        status: ProductStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Invalid(format!("Invalid product id: {id}")));
        }
        validate(&new.title, new.price, new.stock)?;

        Ok(Self {
            id,
            title: new.title,
            price: new.price,
            stock: new.stock,
            begin_at: new.begin_at,
            end_at: new.end_at,
            status: derive_status(new.stock, lift_out_of_stock(status)),
            created_at,
            updated_at,
        })
    }

    /// Attaches the storage-assigned id.
    pub fn assign_id(self, id: i64) -> Result<Self, DomainError> {
        check_assignable("product", self.id, id)?;
        Ok(Self { id, ..self })
    }

    /// Removes `quantity` units from stock.
    ///
    /// # Errors
    /// [`DomainError::Invalid`] for a non-positive quantity,
    /// [`DomainError::InsufficientStock`] when `quantity` exceeds the stock.
    pub fn decrease_stock(self, quantity: i64, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::Invalid(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        if quantity > self.stock {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                available: self.stock,
            });
        }
        let stock = self.stock - quantity;
        self.update_stock(stock, now)
    }

    /// Replaces the stock level and re-derives the status.
    pub fn update_stock(self, stock: i64, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if stock < 0 {
            return Err(DomainError::Invalid(
                "Stock must be non-negative".to_string(),
            ));
        }
        Ok(Self {
            stock,
            status: derive_status(stock, lift_out_of_stock(self.status)),
            updated_at: now,
            ..self
        })
    }

    /// Active, in stock and inside the sales window.
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.status == ProductStatus::Active
            && self.stock > 0
            && self.begin_at <= now
            && now <= self.end_at
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn price(&self) -> i64 {
        self.price
    }

    pub const fn stock(&self) -> i64 {
        self.stock
    }

    pub const fn begin_at(&self) -> DateTime<Utc> {
        self.begin_at
    }

    pub const fn end_at(&self) -> DateTime<Utc> {
        self.end_at
    }

    pub const fn status(&self) -> ProductStatus {
        self.status
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate(title: &str, price: i64, stock: i64) -> Result<(), DomainError> {
    if title.trim().is_empty() || price < 0 || stock < 0 {
        return Err(DomainError::Invalid(
            "Invalid request: title is required, price and stock must be non-negative"
                .to_string(),
        ));
    }
    Ok(())
}

// A restock lifts OutOfStock back to Active; Inactive stays Inactive.
const fn lift_out_of_stock(status: ProductStatus) -> ProductStatus {
    match status {
        ProductStatus::OutOfStock => ProductStatus::Active,
        other => other,
    }
}

const fn derive_status(stock: i64, previous: ProductStatus) -> ProductStatus {
    if stock == 0 {
        ProductStatus::OutOfStock
    } else {
        previous
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn new_product(stock: i64) -> NewProduct {
        NewProduct {
            title: "  Mechanical Keyboard ".to_string(),
            price: 12_000,
            stock,
            begin_at: now() - Duration::days(1),
            end_at: now() + Duration::days(30),
        }
    }

    #[test]
    fn test_create_trims_title_and_derives_status() {
        let product = Product::create(new_product(5), now()).unwrap();
        assert_eq!(product.id(), 0);
        assert_eq!(product.title(), "Mechanical Keyboard");
        assert_eq!(product.status(), ProductStatus::Active);

        let empty = Product::create(new_product(0), now()).unwrap();
        assert_eq!(empty.status(), ProductStatus::OutOfStock);
    }

    #[test]
    fn test_create_rejects_invalid_fields() {
        let mut blank = new_product(1);
        blank.title = "   ".to_string();
        assert!(Product::create(blank, now()).is_err());

        let mut negative_price = new_product(1);
        negative_price.price = -1;
        assert!(Product::create(negative_price, now()).is_err());

        assert!(Product::create(new_product(-3), now()).is_err());
    }

    #[test]
    fn test_decrease_stock_to_zero_marks_out_of_stock() {
        let product = Product::create(new_product(4), now()).unwrap();
        let drained = product.decrease_stock(4, now()).unwrap();
        assert_eq!(drained.stock(), 0);
        assert_eq!(drained.status(), ProductStatus::OutOfStock);
        assert!(!drained.is_available(now()));
    }

    #[test]
    fn test_decrease_stock_beyond_available_fails() {
        let product = Product::create(new_product(4), now()).unwrap();
        let err = product.clone().decrease_stock(5, now()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 5,
                available: 4
            }
        );

        assert!(product.decrease_stock(0, now()).unwrap_err().is_validation());
    }

    #[test]
    fn test_restock_returns_to_active() {
        let product = Product::create(new_product(0), now()).unwrap();
        let restocked = product.update_stock(10, now()).unwrap();
        assert_eq!(restocked.status(), ProductStatus::Active);
        assert!(restocked.is_available(now()));
    }

    #[test]
    fn test_inactive_product_stays_inactive_on_restock() {
        let product = Product::reconstitute(
            3,
            new_product(2),
            ProductStatus::Inactive,
            now(),
            now(),
        )
        .unwrap();
        let restocked = product.update_stock(7, now()).unwrap();
        assert_eq!(restocked.status(), ProductStatus::Inactive);
        assert!(!restocked.is_available(now()));
    }

    #[test]
    fn test_availability_respects_sales_window() {
        let product = Product::create(new_product(3), now()).unwrap();
        assert!(product.is_available(now()));
        assert!(!product.is_available(now() - Duration::days(2)));
        assert!(!product.is_available(now() + Duration::days(31)));
    }

    #[test]
    fn test_assign_id_only_once() {
        let product = Product::create(new_product(1), now()).unwrap();
        let saved = product.assign_id(9).unwrap();
        assert_eq!(saved.id(), 9);
        assert!(saved.assign_id(10).is_err());
    }
}
