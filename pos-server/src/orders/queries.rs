//! Read-side order lookups used by the storefront and the admin panel
//!
//! Listings are returned with their items, newest first.

use shared::models::{Order, OrderDetail, OrderStatus, ServiceType};
use sqlx::SqlitePool;

use super::state_machine::{self, OrderRef};
use crate::db::{catalog, orders};
use crate::error::ServiceResult;
use crate::utils::{AppError, ErrorCode};

/// Default admin page size
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Size of the kitchen's pending queue
pub const PENDING_QUEUE_SIZE: i64 = 100;

pub async fn detail(pool: &SqlitePool, target: OrderRef<'_>) -> ServiceResult<OrderDetail> {
    let mut conn = pool.acquire().await?;
    let order = state_machine::load(&mut conn, target).await?;
    let items = orders::find_items(&mut *conn, order.id).await?;
    Ok(OrderDetail { order, items })
}

async fn with_items(pool: &SqlitePool, list: Vec<Order>) -> ServiceResult<Vec<OrderDetail>> {
    let mut out = Vec::with_capacity(list.len());
    for order in list {
        let items = orders::find_items(pool, order.id).await?;
        out.push(OrderDetail { order, items });
    }
    Ok(out)
}

/// Every order placed at a table
pub async fn for_table_number(
    pool: &SqlitePool,
    table_number: &str,
) -> ServiceResult<Vec<OrderDetail>> {
    let list = orders::list_by_table_number(pool, table_number).await?;
    with_items(pool, list).await
}

/// Open orders of a table (cancelled excluded)
pub async fn for_table_id(pool: &SqlitePool, table_id: i64) -> ServiceResult<Vec<OrderDetail>> {
    if catalog::find_table_by_id(pool, table_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::TableNotFound)
            .with_detail("table_id", table_id)
            .into());
    }
    let list = orders::list_by_table_id(pool, table_id).await?;
    with_items(pool, list).await
}

/// "My orders": a device's orders still in the kitchen
pub async fn for_device(pool: &SqlitePool, device_id: &str) -> ServiceResult<Vec<OrderDetail>> {
    let list = orders::list_active_by_device(pool, device_id).await?;
    with_items(pool, list).await
}

/// Delivery or takeaway board (cancelled excluded)
pub async fn by_service_type(
    pool: &SqlitePool,
    service_type: ServiceType,
) -> ServiceResult<Vec<OrderDetail>> {
    let list = orders::list_by_service_type(pool, service_type).await?;
    with_items(pool, list).await
}

/// Admin page; `page` is 1-based, a page past the end is empty
pub async fn page(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    page: i64,
    limit: i64,
) -> ServiceResult<Vec<OrderDetail>> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let offset = (page.max(1) - 1).saturating_mul(limit);
    let list = orders::list_paginated(pool, status, limit, offset).await?;
    with_items(pool, list).await
}
