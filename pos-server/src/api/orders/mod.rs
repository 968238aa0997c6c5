//! Order API Module

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::state::AppState;

/// Order router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        // Storefront
        .route("/", post(handler::create))
        .route("/my-orders", get(handler::my_orders))
        .route("/table/{table_number}", get(handler::list_by_table_number))
        .route("/{order_no}", get(handler::get_by_order_no))
        .route("/{order_no}/status", patch(handler::update_status_by_order_no))
        // Admin panel
        .route("/admin/pending", get(handler::admin_pending))
        .route("/admin/list", get(handler::admin_list))
        .route("/admin/table/{table_id}", get(handler::admin_list_by_table))
        .route("/admin/delivery", get(handler::admin_delivery))
        .route("/admin/takeaway", get(handler::admin_takeaway))
        .route("/admin/status/{id}", put(handler::update_status_by_id))
        .route("/admin/items/{item_id}", delete(handler::remove_item))
        .route("/admin/{id}", delete(handler::purge))
}
