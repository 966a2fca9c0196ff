//! `/payments` routes.

use super::{AppState, created, json_body, ok, parse_id, query_params};
use crate::{
    core::payment,
    domain::{NewPayment, Payment, PaymentStatus},
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
pub struct CreatePaymentRequest {
    pub order_id: i64,
    pub amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilter {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: i64,
    pub order_id: i64,
    pub paid_at: DateTime<Utc>,
    pub amount: i64,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.id(),
            order_id: payment.order_id(),
            paid_at: payment.paid_at(),
            amount: payment.amount(),
            status: payment.status().as_str(),
            created_at: payment.created_at(),
            updated_at: payment.updated_at(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show))
        .route("/:id/complete", post(complete))
        .route("/:id/fail", post(fail))
        .route("/:id/refund", post(refund))
}

async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<PaymentFilter>, QueryRejection>,
) -> Result<Response> {
    let filter = query_params(query)?;
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<PaymentStatus>)
        .transpose()?;
    let payments = payment::list_payments(&state.db, status).await?;
    Ok(ok(payments.iter().map(PaymentResponse::from).collect::<Vec<_>>()))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let payment = payment::get_payment(&state.db, parse_id(&id)?).await?;
    Ok(ok(PaymentResponse::from(&payment)))
}

async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let payment = payment::create_payment(
        &state.db,
        NewPayment {
            order_id: request.order_id,
            amount: request.amount,
        },
    )
    .await?;
    Ok(created(PaymentResponse::from(&payment)))
}

async fn complete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let payment = payment::complete_payment(&state.db, parse_id(&id)?).await?;
    Ok(ok(PaymentResponse::from(&payment)))
}

async fn fail(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let payment = payment::fail_payment(&state.db, parse_id(&id)?).await?;
    Ok(ok(PaymentResponse::from(&payment)))
}

async fn refund(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let payment = payment::refund_payment(&state.db, parse_id(&id)?).await?;
    Ok(ok(PaymentResponse::from(&payment)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::{send, test_app};
    use crate::errors::Result;
    use crate::test_utils::create_test_order;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_payment_lifecycle_over_http() -> Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        let order = create_test_order(&db).await?;
        let app = crate::api::router(crate::api::AppState::new(
            db,
            crate::config::settings::Settings::default(),
        ));
        let order_id = order.id();

        let (status, body) = send(
            &app,
            Method::POST,
            "/payments",
            Some(json!({ "order_id": order_id, "amount": 3_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot create payment for pending order");

        send(&app, Method::POST, &format!("/orders/{order_id}/confirm"), None).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/payments",
            Some(json!({ "order_id": order_id, "amount": 3_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "Pending");
        let payment_id = body["data"]["payment_id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            "/payments",
            Some(json!({ "order_id": order_id, "amount": 3_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Payment already exists for this order");

        let (_, body) = send(&app, Method::POST, &format!("/payments/{payment_id}/complete"), None).await;
        assert_eq!(body["data"]["status"], "Completed");
        let (_, body) = send(&app, Method::GET, &format!("/orders/{order_id}"), None).await;
        assert_eq!(body["data"]["status"], "Completed");

        let (status, body) = send(&app, Method::POST, &format!("/payments/{payment_id}/fail"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot fail completed payment");

        let (_, body) = send(&app, Method::POST, &format!("/payments/{payment_id}/refund"), None).await;
        assert_eq!(body["data"]["status"], "Refunded");

        let (_, body) = send(&app, Method::GET, "/payments?status=Refunded", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_lookup_errors() -> Result<()> {
        let app = test_app().await?;
        let (status, body) = send(&app, Method::GET, "/payments/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Payment not found");

        let (status, _) = send(&app, Method::GET, "/payments/nine", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, Method::GET, "/payments?status=Failed&status=Pending", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
        Ok(())
    }
}
