//! Payment API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/payment", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(handler::create))
        // Gateway callback (signature-verified, raw body)
        .route("/callback", post(handler::callback))
        .route("/status/{order_no}", get(handler::status))
        .route("/reconcile/{order_no}", post(handler::reconcile))
        .route("/mock-success", post(handler::mock_success))
}
