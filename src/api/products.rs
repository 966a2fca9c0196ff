//! `/products` routes.

use super::{AppState, created, json_body, ok, parse_id, timestamp::TimestampInput};
use crate::{
    core::product,
    domain::{NewProduct, Product},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    pub price: i64,
    pub stock: i64,
    pub begin_at: TimestampInput,
    pub end_at: TimestampInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductStockRequest {
    pub stock: i64,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product_id: i64,
    pub title: String,
    pub price: i64,
    pub stock: i64,
    pub begin_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id(),
            title: product.title().to_string(),
            price: product.price(),
            stock: product.stock(),
            begin_at: product.begin_at(),
            end_at: product.end_at(),
            status: product.status().as_str(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show))
        .route("/:id/stock", patch(update_stock))
}

async fn list(State(state): State<AppState>) -> Result<Response> {
    let products = product::list_products(&state.db).await?;
    Ok(ok(products.iter().map(ProductResponse::from).collect::<Vec<_>>()))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let product = product::get_product(&state.db, parse_id(&id)?).await?;
    Ok(ok(ProductResponse::from(&product)))
}

async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let new = NewProduct {
        title: request.title,
        price: request.price,
        stock: request.stock,
        begin_at: request.begin_at.resolve("begin_at")?,
        end_at: request.end_at.resolve("end_at")?,
    };
    let product = product::create_product(&state.db, new).await?;
    Ok(created(ProductResponse::from(&product)))
}

async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateProductStockRequest>, JsonRejection>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let request = json_body(payload)?;
    let product = product::update_product_stock(&state.db, id, request.stock).await?;
    Ok(ok(ProductResponse::from(&product)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::{send, test_app};
    use crate::errors::Result;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_restock_product() -> Result<()> {
        let app = test_app().await?;
        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(json!({
                "title": "Desk lamp",
                "price": 4_500,
                "stock": 1,
                "begin_at": "2000-01-01T00:00:00Z",
                "end_at": 4_102_444_800_000_i64,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "Active");
        let id = body["data"]["product_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/products/{id}/stock"),
            Some(json!({ "stock": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "OutOfStock");

        let (_, body) = send(&app, Method::GET, "/products", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_product_request_errors() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = send(&app, Method::GET, "/products/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid id");
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(&app, Method::GET, "/products/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(json!({
                "title": "Lamp",
                "price": 10,
                "stock": 1,
                "begin_at": "whenever",
                "end_at": "2100-01-01T00:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid begin_at");

        let (status, body) = send(&app, Method::POST, "/products", Some(json!({ "title": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        Ok(())
    }
}
