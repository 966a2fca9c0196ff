//! `/coupons` routes. Coupons are addressed by their code.

use super::{AppState, created, json_body, ok, timestamp::TimestampInput};
use crate::{
    core::coupon,
    domain::{Coupon, CouponStatus, DiscountType, NewCoupon},
    errors::{Error, Result},
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
pub struct CreateCouponRequest {
    pub code: String,
    /// `"Percentage"` or `"Fixed"`
    pub discount_type: String,
    pub discount_value: i64,
    pub valid_from: TimestampInput,
    pub valid_until: TimestampInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCouponStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CalculateDiscountRequest {
    pub original_price: i64,
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub coupon_id: i64,
    pub code: String,
    pub discount_type: &'static str,
    pub discount_value: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Coupon> for CouponResponse {
    fn from(coupon: &Coupon) -> Self {
        Self {
            coupon_id: coupon.id(),
            code: coupon.code().to_string(),
            discount_type: coupon.discount_type().kind(),
            discount_value: coupon.discount_type().value(),
            valid_from: coupon.valid_from(),
            valid_until: coupon.valid_until(),
            status: coupon.status().as_str(),
            created_at: coupon.created_at(),
            updated_at: coupon.updated_at(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/active", get(list_active))
        .route("/:code", get(show))
        .route("/:code/status", patch(change_status))
        .route("/:code/calculate", post(calculate))
}

fn to_responses(coupons: &[Coupon]) -> Vec<CouponResponse> {
    coupons.iter().map(CouponResponse::from).collect()
}

async fn list(State(state): State<AppState>) -> Result<Response> {
    let coupons = coupon::list_coupons(&state.db).await?;
    Ok(ok(to_responses(&coupons)))
}

async fn list_active(State(state): State<AppState>) -> Result<Response> {
    let coupons = coupon::list_active_coupons(&state.db).await?;
    Ok(ok(to_responses(&coupons)))
}

async fn show(State(state): State<AppState>, Path(code): Path<String>) -> Result<Response> {
    let coupon = coupon::get_coupon_by_code(&state.db, &code).await?;
    Ok(ok(CouponResponse::from(&coupon)))
}

async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCouponRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    // Range checks on the value happen in the use case.
    let discount_type = match request.discount_type.as_str() {
        "Percentage" => DiscountType::Percentage(request.discount_value),
        "Fixed" => DiscountType::Fixed(request.discount_value),
        _ => return Err(Error::validation("Invalid discount_type")),
    };
    let new = NewCoupon {
        code: request.code,
        discount_type,
        valid_from: request.valid_from.resolve("valid_from")?,
        valid_until: request.valid_until.resolve("valid_until")?,
    };
    let coupon = coupon::create_coupon(&state.db, new).await?;
    Ok(created(CouponResponse::from(&coupon)))
}

async fn change_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: std::result::Result<Json<UpdateCouponStatusRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let status: CouponStatus = request.status.parse()?;
    let coupon = coupon::change_coupon_status(&state.db, &code, status).await?;
    Ok(ok(CouponResponse::from(&coupon)))
}

async fn calculate(
    State(state): State<AppState>,
    Path(code): Path<String>,
    payload: std::result::Result<Json<CalculateDiscountRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let quote = coupon::calculate_discount(&state.db, &code, request.original_price).await?;
    Ok(ok(quote))
}
