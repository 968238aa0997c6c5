//! Print API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/print", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/receipt/{order_id}", get(handler::receipt))
        // printAndComplete: prints and moves open orders to completed
        .route("/batch", post(handler::batch))
}
