//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use shared::models::{Order, OrderCreated, OrderDetail, OrderStatus, ServiceType};

use crate::api::json_body;
use crate::orders::{
    self, CartRequest, OrderRef, StatusUpdateRequest, TransitionSource, queries, state_machine,
};
use crate::state::AppState;
use crate::utils::{ApiResponse, AppResult};

/// Query params for the admin listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    queries::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    #[serde(default, alias = "deviceId")]
    pub device_id: Option<String>,
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<OrderStatus>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()
}

/// Create an order from a cart
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CartRequest>, JsonRejection>,
) -> AppResult<ApiResponse<OrderCreated>> {
    let cart = json_body(payload)?.validate()?;
    let created = orders::create_order(&state.pool, cart).await?;
    Ok(ApiResponse::success(created))
}

/// Order with items by order number
pub async fn get_by_order_no(
    State(state): State<AppState>,
    Path(order_no): Path<String>,
) -> AppResult<ApiResponse<OrderDetail>> {
    let detail = queries::detail(&state.pool, OrderRef::OrderNo(&order_no)).await?;
    Ok(ApiResponse::success(detail))
}

pub async fn list_by_table_number(
    State(state): State<AppState>,
    Path(table_number): Path<String>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let list = queries::for_table_number(&state.pool, &table_number).await?;
    Ok(ApiResponse::success(list))
}

/// Device's active orders; no device id means nothing to show
pub async fn my_orders(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let Some(device_id) = query.device_id.filter(|d| !d.trim().is_empty()) else {
        return Ok(ApiResponse::success(Vec::new()));
    };
    let list = queries::for_device(&state.pool, device_id.trim()).await?;
    Ok(ApiResponse::success(list))
}

/// Staff status / payment update by order number
pub async fn update_status_by_order_no(
    State(state): State<AppState>,
    Path(order_no): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let request = json_body(payload)?.validate()?;
    let order = state_machine::apply(
        &state.pool,
        OrderRef::OrderNo(&order_no),
        &request,
        TransitionSource::Staff,
    )
    .await?;
    Ok(ApiResponse::success(order))
}

/// Staff status update by id
pub async fn update_status_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Order>> {
    let request = json_body(payload)?.validate()?;
    let order =
        state_machine::apply(&state.pool, OrderRef::Id(id), &request, TransitionSource::Staff)
            .await?;
    Ok(ApiResponse::success(order))
}

/// Kitchen queue (default `pending`)
pub async fn admin_pending(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let status = parse_status(query.status.as_deref())?.unwrap_or(OrderStatus::Pending);
    let list = queries::page(&state.pool, Some(status), 1, queries::PENDING_QUEUE_SIZE).await?;
    Ok(ApiResponse::success(list))
}

pub async fn admin_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let status = parse_status(query.status.as_deref())?;
    let list = queries::page(&state.pool, status, query.page, query.limit).await?;
    Ok(ApiResponse::success(list))
}

pub async fn admin_list_by_table(
    State(state): State<AppState>,
    Path(table_id): Path<i64>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let list = queries::for_table_id(&state.pool, table_id).await?;
    Ok(ApiResponse::success(list))
}

pub async fn admin_delivery(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let list = queries::by_service_type(&state.pool, ServiceType::Delivery).await?;
    Ok(ApiResponse::success(list))
}

pub async fn admin_takeaway(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OrderDetail>>> {
    let list = queries::by_service_type(&state.pool, ServiceType::Takeaway).await?;
    Ok(ApiResponse::success(list))
}

/// Remove one line; the order total is recomputed
pub async fn remove_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<ApiResponse<Order>> {
    let order = state_machine::remove_item(&state.pool, item_id).await?;
    Ok(ApiResponse::success(order))
}

/// Purge an order and its items
pub async fn purge(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state_machine::purge(&state.pool, id).await?;
    Ok(ApiResponse::ok())
}
