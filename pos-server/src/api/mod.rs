//! HTTP API
//!
//! - `/health`
//! - `/api/orders`: storefront + admin order operations
//! - `/api/payment`: gateway adapter endpoints
//! - `/api/print`: receipts and batch printing

pub mod health;
pub mod orders;
pub mod payment;
pub mod print;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::utils::{AppError, AppResult};

/// Carts and callbacks are small JSON bodies
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payment::router())
        .merge(print::router())
}

/// Fully configured application, used by the server and by tests
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a JSON extractor rejection into a validation error
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_request(rejection.body_text()))
}
