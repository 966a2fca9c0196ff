//! `/orders` routes.

use super::{AppState, created, json_body, ok, parse_id, query_params};
use crate::{
    core::order,
    domain::{NewOrder, Order, OrderStatus},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Response,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub cart_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    pub paid_amount: i64,
    pub discount_amount: i64,
}

/// `?status=Pending` and friends.
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

impl StatusFilter {
    fn order_status(&self) -> Result<Option<OrderStatus>> {
        Ok(self.status.as_deref().map(str::parse).transpose()?)
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub coupon_id: Option<i64>,
    pub quantity: i64,
    pub paid_amount: i64,
    pub discount_amount: i64,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            cart_id: order.cart_id(),
            product_id: order.product_id(),
            coupon_id: order.coupon_id(),
            quantity: order.quantity(),
            paid_amount: order.paid_amount(),
            discount_amount: order.discount_amount(),
            status: order.status().as_str(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show))
        .route("/:id/confirm", post(confirm))
        .route("/:id/cancel", post(cancel))
        .route("/:id/complete", post(complete))
}

async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<StatusFilter>, QueryRejection>,
) -> Result<Response> {
    let filter = query_params(query)?;
    let orders = order::list_orders(&state.db, filter.order_status()?).await?;
    Ok(ok(orders.iter().map(OrderResponse::from).collect::<Vec<_>>()))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let order = order::get_order(&state.db, parse_id(&id)?).await?;
    Ok(ok(OrderResponse::from(&order)))
}

async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let new = NewOrder {
        cart_id: request.cart_id,
        product_id: request.product_id,
        coupon_id: request.coupon_id,
        quantity: request.quantity,
        paid_amount: request.paid_amount,
        discount_amount: request.discount_amount,
    };
    let order = order::create_order(&state.db, new).await?;
    Ok(created(OrderResponse::from(&order)))
}

async fn confirm(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let order = order::confirm_order(&state.db, parse_id(&id)?).await?;
    Ok(ok(OrderResponse::from(&order)))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let order = order::cancel_order(&state.db, parse_id(&id)?).await?;
    Ok(ok(OrderResponse::from(&order)))
}

async fn complete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let order = order::complete_order(&state.db, parse_id(&id)?).await?;
    Ok(ok(OrderResponse::from(&order)))
}
