//! `/carts` routes, including checkout.

use super::{
    AppState, created, json_body, ok, parse_id,
    timestamp::{TimestampInput, resolve_optional},
};
use crate::{
    core::{
        cart::{self, CreateCart},
        checkout::{CheckoutResult, checkout_cart},
    },
    domain::Cart,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateCartRequest {
    pub product_id: i64,
    #[serde(default)]
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    #[serde(default)]
    pub expired_at: Option<TimestampInput>,
    #[serde(default)]
    pub keep_until: Option<TimestampInput>,
}

/// `null` detaches the coupon.
#[derive(Debug, Deserialize)]
pub struct UpdateCartCouponRequest {
    pub coupon_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart_id: i64,
    pub product_id: i64,
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    pub expired_at: DateTime<Utc>,
    pub keep_until: DateTime<Utc>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            cart_id: cart.id(),
            product_id: cart.product_id(),
            coupon_id: cart.coupon_id(),
            quantity: cart.quantity(),
            expired_at: cart.expired_at(),
            keep_until: cart.keep_until(),
            status: cart.status().as_str(),
            created_at: cart.created_at(),
            updated_at: cart.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub original_amount: i64,
    pub discount_amount: i64,
    pub paid_amount: i64,
    pub coupon_code: Option<String>,
    pub order_status: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<CheckoutResult> for CheckoutResponse {
    fn from(result: CheckoutResult) -> Self {
        Self {
            order_id: result.order.id(),
            cart_id: result.cart_id,
            product_id: result.product_id,
            quantity: result.quantity,
            original_amount: result.original_amount,
            discount_amount: result.discount_amount,
            paid_amount: result.paid_amount,
            coupon_code: result.coupon_code,
            order_status: result.order.status().as_str(),
            created_at: result.order.created_at(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/active", get(list_active))
        .route("/:id", get(show))
        .route("/:id/quantity", patch(update_quantity))
        .route("/:id/coupon", patch(update_coupon))
        .route("/:id/checkout", post(checkout))
}

fn to_responses(carts: &[Cart]) -> Vec<CartResponse> {
    carts.iter().map(CartResponse::from).collect()
}

async fn list(State(state): State<AppState>) -> Result<Response> {
    let carts = cart::list_carts(&state.db).await?;
    Ok(ok(to_responses(&carts)))
}

async fn list_active(State(state): State<AppState>) -> Result<Response> {
    let carts = cart::list_active_carts(&state.db).await?;
    Ok(ok(to_responses(&carts)))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let cart = cart::get_cart(&state.db, parse_id(&id)?).await?;
    Ok(ok(CartResponse::from(&cart)))
}

async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCartRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let create = CreateCart {
        product_id: request.product_id,
        coupon_id: request.coupon_id,
        quantity: request.quantity,
        expired_at: resolve_optional(request.expired_at.as_ref(), "expired_at")?,
        keep_until: resolve_optional(request.keep_until.as_ref(), "keep_until")?,
    };
    let cart = cart::create_cart(&state.db, create, &state.settings.cart).await?;
    Ok(created(CartResponse::from(&cart)))
}

async fn update_quantity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateCartQuantityRequest>, JsonRejection>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let request = json_body(payload)?;
    let cart = cart::update_cart_quantity(&state.db, id, request.quantity).await?;
    Ok(ok(CartResponse::from(&cart)))
}

async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateCartCouponRequest>, JsonRejection>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let request = json_body(payload)?;
    let cart = cart::update_cart_coupon(&state.db, id, request.coupon_id).await?;
    Ok(ok(CartResponse::from(&cart)))
}

async fn checkout(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let result = checkout_cart(&state.db, parse_id(&id)?).await?;
    Ok(created(CheckoutResponse::from(result)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::{send, test_app};
    use crate::errors::Result;
    use axum::{
        Router,
        http::{Method, StatusCode},
    };
    use serde_json::json;

    async fn product(app: &Router, price: i64, stock: i64) -> i64 {
        let (_, body) = send(
            app,
            Method::POST,
            "/products",
            Some(json!({
                "title": "Notebook",
                "price": price,
                "stock": stock,
                "begin_at": "2000-01-01T00:00:00Z",
                "end_at": "2100-01-01T00:00:00Z",
            })),
        )
        .await;
        body["data"]["product_id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_coupon_checkout_end_to_end() -> Result<()> {
        let app = test_app().await?;
        let product_id = product(&app, 10_000, 5).await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/coupons",
            Some(json!({
                "code": "TENOFF",
                "discount_type": "Percentage",
                "discount_value": 10,
                "valid_from": "2000-01-01T00:00:00Z",
                "valid_until": "2100-01-01T00:00:00Z",
            })),
        )
        .await;
        let coupon_id = body["data"]["coupon_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            "/carts",
            Some(json!({ "product_id": product_id, "coupon_id": coupon_id, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "Active");
        let cart_id = body["data"]["cart_id"].as_i64().unwrap();

        let (status, body) =
            send(&app, Method::POST, &format!("/carts/{cart_id}/checkout"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let data = &body["data"];
        assert_eq!(data["original_amount"], 20_000);
        assert_eq!(data["discount_amount"], 2_000);
        assert_eq!(data["paid_amount"], 18_000);
        assert_eq!(data["coupon_code"], "TENOFF");
        assert_eq!(data["order_status"], "Pending");

        let (_, body) = send(&app, Method::GET, &format!("/products/{product_id}"), None).await;
        assert_eq!(body["data"]["stock"], 3);
        let (_, body) = send(&app, Method::GET, &format!("/carts/{cart_id}"), None).await;
        assert_eq!(body["data"]["status"], "CheckedOut");

        let (status, body) =
            send(&app, Method::POST, &format!("/carts/{cart_id}/checkout"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("code").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_cart_updates_and_errors() -> Result<()> {
        let app = test_app().await?;
        let product_id = product(&app, 500, 3).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/carts",
            Some(json!({ "product_id": product_id, "quantity": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Insufficient stock. Available: 3");

        let (_, body) = send(
            &app,
            Method::POST,
            "/carts",
            Some(json!({
                "product_id": product_id,
                "quantity": 1,
                "expired_at": "4102444800000",
            })),
        )
        .await;
        let cart_id = body["data"]["cart_id"].as_i64().unwrap();
        assert_eq!(body["data"]["expired_at"], "2100-01-01T00:00:00Z");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/carts/{cart_id}/quantity"),
            Some(json!({ "quantity": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["quantity"], 3);

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/carts/{cart_id}/coupon"),
            Some(json!({ "coupon_id": 404 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Coupon not found");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/carts/{cart_id}/coupon"),
            Some(json!({ "coupon_id": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["coupon_id"].is_null());

        let (_, body) = send(&app, Method::GET, "/carts/active", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::POST, "/carts/x1/checkout", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid id");
        Ok(())
    }
}
