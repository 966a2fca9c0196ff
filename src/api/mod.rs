//! HTTP surface: axum routers, request parsing and the JSON response envelope.

pub mod carts;
pub mod coupons;
mod error;
pub mod orders;
pub mod payments;
pub mod products;
pub mod timestamp;

use crate::{
    config::settings::Settings,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/products", products::routes())
        .nest("/coupons", coupons::routes())
        .nest("/carts", carts::routes())
        .nest("/orders", orders::routes())
        .nest("/payments", payments::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Storefront API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "products": "/products",
            "coupons": "/coupons",
            "carts": "/carts",
            "orders": "/orders",
            "payments": "/payments",
        },
    }))
}

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub(crate) fn ok<T: Serialize>(data: T) -> Response {
    respond(StatusCode::OK, data)
}

pub(crate) fn created<T: Serialize>(data: T) -> Response {
    respond(StatusCode::CREATED, data)
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
        .into_response()
}

/// Parses a numeric path segment.
pub(crate) fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::validation("Invalid id"))
}

/// Unwraps a JSON body, turning axum's rejection into a validation error.
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::validation(format!("Invalid request: {}", rejection.body_text())))
}

/// Unwraps query parameters, turning axum's rejection into a validation error.
pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::validation(format!("Invalid query: {}", rejection.body_text())))
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]
    use super::{AppState, router};
    use crate::config::settings::Settings;
    use crate::errors::Result;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    pub async fn test_app() -> Result<Router> {
        let db = crate::test_utils::setup_test_db().await?;
        Ok(router(AppState::new(db, Settings::default())))
    }

    /// Sends one request and returns the status and parsed JSON body.
    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
