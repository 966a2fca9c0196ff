//! Product repository.

use super::corrupt_row;
use crate::domain::{NewProduct, Product, ProductStatus};
use crate::entities::{ProductColumn, ProductEntity, product};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder};

fn to_domain(model: product::Model) -> Result<Product> {
    let id = model.id;
    let status = model
        .status
        .parse::<ProductStatus>()
        .map_err(|e| corrupt_row("products", id, &e))?;

    Product::reconstitute(
        model.id,
        NewProduct {
            title: model.title,
            price: model.price,
            stock: model.stock,
            begin_at: model.begin_at,
            end_at: model.end_at,
        },
        status,
        model.created_at,
        model.updated_at,
    )
    .map_err(|e| corrupt_row("products", id, &e))
}

fn to_active_model(product: &Product) -> product::ActiveModel {
    product::ActiveModel {
        id: if product.id() == 0 {
            NotSet
        } else {
            Unchanged(product.id())
        },
        title: Set(product.title().to_string()),
        price: Set(product.price()),
        stock: Set(product.stock()),
        begin_at: Set(product.begin_at()),
        end_at: Set(product.end_at()),
        status: Set(product.status().as_str().to_string()),
        created_at: Set(product.created_at()),
        updated_at: Set(product.updated_at()),
    }
}

/// Inserts a new product and returns it with its assigned id.
pub async fn create<C: ConnectionTrait>(db: &C, product: Product) -> Result<Product> {
    let model = to_active_model(&product).insert(db).await?;
    Ok(product.assign_id(model.id)?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Product>> {
    ProductEntity::find_by_id(id)
        .one(db)
        .await?
        .map(to_domain)
        .transpose()
}

/// All products, newest first.
pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Product>> {
    ProductEntity::find()
        .order_by_desc(ProductColumn::CreatedAt)
        .order_by_desc(ProductColumn::Id)
        .all(db)
        .await?
        .into_iter()
        .map(to_domain)
        .collect()
}

/// Writes every field of an already persisted product.
pub async fn save<C: ConnectionTrait>(db: &C, product: &Product) -> Result<Product> {
    if product.id() == 0 {
        return Err(Error::validation("Cannot update a product that was never stored"));
    }
    let model = to_active_model(product).update(db).await?;
    to_domain(model)
}

/// Replaces the stock level; `None` when the product does not exist.
pub async fn update_stock<C: ConnectionTrait>(
    db: &C,
    id: i64,
    stock: i64,
    now: DateTime<Utc>,
) -> Result<Option<Product>> {
    let Some(product) = find_by_id(db, id).await? else {
        return Ok(None);
    };
    let updated = product.update_stock(stock, now)?;
    save(db, &updated).await.map(Some)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{new_product, setup_test_db};
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_then_reload_round_trips() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let product = Product::create(new_product("Desk Lamp", 3_500, 4), now)?;

        let created = create(&db, product).await?;
        assert!(created.id() > 0);

        let loaded = find_by_id(&db, created.id()).await?.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.status(), ProductStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_all_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let older = create(
            &db,
            Product::create(new_product("Older", 100, 1), now - Duration::hours(1))?,
        )
        .await?;
        let newer = create(&db, Product::create(new_product("Newer", 100, 1), now)?).await?;

        let ids: Vec<i64> = find_all(&db).await?.iter().map(Product::id).collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_stock_persists_status() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let product = create(&db, Product::create(new_product("Mug", 900, 2), now)?).await?;

        let drained = update_stock(&db, product.id(), 0, now).await?.unwrap();
        assert_eq!(drained.status(), ProductStatus::OutOfStock);

        let reloaded = find_by_id(&db, product.id()).await?.unwrap();
        assert_eq!(reloaded.stock(), 0);
        assert_eq!(reloaded.status(), ProductStatus::OutOfStock);

        assert!(update_stock(&db, 9_999, 5, now).await?.is_none());
        assert!(update_stock(&db, product.id(), -1, now).await.is_err());
        Ok(())
    }
}
