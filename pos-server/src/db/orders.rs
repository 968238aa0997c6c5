//! Order persistence (orders + order_items)

use shared::models::{
    Language, Order, OrderItem, OrderStatus, PaymentStatus, ServiceType,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteExecutor;

const ORDER_COLUMNS: &str = "id, order_no, table_id, table_number, service_type, total_amount, status, payment_status, payment_method, kpay_transaction_id, remark, language, device_id, is_printed, created_at, paid_at, completed_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, unit_price, options, subtotal";

/// Order header to insert
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub order_no: &'a str,
    pub table_id: Option<i64>,
    pub table_number: Option<&'a str>,
    pub service_type: ServiceType,
    pub total_amount: f64,
    pub remark: Option<&'a str>,
    pub language: Language,
    pub device_id: Option<&'a str>,
    pub created_at: &'a str,
}

/// Order line to insert
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub options: Option<String>,
    pub subtotal: f64,
}

pub async fn insert_order<'e>(
    exec: impl SqliteExecutor<'e>,
    order: &NewOrder<'_>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO orders (order_no, table_id, table_number, service_type, total_amount, status, payment_status, remark, language, device_id, is_printed, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(order.order_no)
    .bind(order.table_id)
    .bind(order.table_number)
    .bind(order.service_type)
    .bind(order.total_amount)
    .bind(OrderStatus::Pending)
    .bind(PaymentStatus::Unpaid)
    .bind(order.remark)
    .bind(order.language)
    .bind(order.device_id)
    .bind(order.created_at)
    .execute(exec)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_item<'e>(
    exec: impl SqliteExecutor<'e>,
    order_id: i64,
    item: &NewOrderItem,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price, options, subtotal) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(&item.options)
    .bind(item.subtotal)
    .execute(exec)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn find_by_order_no<'e>(
    exec: impl SqliteExecutor<'e>,
    order_no: &str,
) -> Result<Option<Order>, sqlx::Error> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_no = ?");
    sqlx::query_as::<_, Order>(&sql)
        .bind(order_no)
        .fetch_optional(exec)
        .await
}

pub async fn find_items<'e>(
    exec: impl SqliteExecutor<'e>,
    order_id: i64,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY id");
    sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(exec)
        .await
}

pub async fn find_item<'e>(
    exec: impl SqliteExecutor<'e>,
    item_id: i64,
) -> Result<Option<OrderItem>, sqlx::Error> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE id = ?");
    sqlx::query_as::<_, OrderItem>(&sql)
        .bind(item_id)
        .fetch_optional(exec)
        .await
}

pub async fn delete_item<'e>(exec: impl SqliteExecutor<'e>, item_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM order_items WHERE id = ?")
        .bind(item_id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_total<'e>(
    exec: impl SqliteExecutor<'e>,
    order_id: i64,
    total_amount: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET total_amount = ? WHERE id = ?")
        .bind(total_amount)
        .bind(order_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Write status and the completion stamp together
pub async fn update_status<'e>(
    exec: impl SqliteExecutor<'e>,
    order_id: i64,
    status: OrderStatus,
    completed_at: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = ?, completed_at = ? WHERE id = ?")
        .bind(status)
        .bind(completed_at)
        .bind(order_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Payment fields written together
#[derive(Debug, Clone, Copy)]
pub struct PaymentUpdate<'a> {
    pub payment_status: PaymentStatus,
    pub paid_at: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
    pub payment_method: Option<&'a str>,
}

pub async fn update_payment<'e>(
    exec: impl SqliteExecutor<'e>,
    order_id: i64,
    update: PaymentUpdate<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET payment_status = ?, paid_at = ?, kpay_transaction_id = COALESCE(?, kpay_transaction_id), payment_method = COALESCE(?, payment_method) WHERE id = ?",
    )
    .bind(update.payment_status)
    .bind(update.paid_at)
    .bind(update.transaction_id)
    .bind(update.payment_method)
    .bind(order_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn mark_printed<'e>(exec: impl SqliteExecutor<'e>, order_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET is_printed = 1 WHERE id = ?")
        .bind(order_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Purge an order; items go with it via `ON DELETE CASCADE`
pub async fn delete_order<'e>(exec: impl SqliteExecutor<'e>, order_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(order_id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Listings ────────────────────────────────────────────────────────

pub async fn list_by_table_number(
    pool: &SqlitePool,
    table_number: &str,
) -> Result<Vec<Order>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE table_number = ? ORDER BY created_at DESC, id DESC"
    );
    sqlx::query_as::<_, Order>(&sql)
        .bind(table_number)
        .fetch_all(pool)
        .await
}

pub async fn list_by_table_id(pool: &SqlitePool, table_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE table_id = ? AND status != 'cancelled' ORDER BY created_at DESC, id DESC"
    );
    sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .fetch_all(pool)
        .await
}

/// "My orders": a device's orders still in the kitchen
pub async fn list_active_by_device(
    pool: &SqlitePool,
    device_id: &str,
) -> Result<Vec<Order>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE device_id = ? AND status IN ('pending', 'preparing') ORDER BY created_at DESC, id DESC"
    );
    sqlx::query_as::<_, Order>(&sql)
        .bind(device_id)
        .fetch_all(pool)
        .await
}

pub async fn list_by_service_type(
    pool: &SqlitePool,
    service_type: ServiceType,
) -> Result<Vec<Order>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE service_type = ? AND status != 'cancelled' ORDER BY created_at DESC, id DESC"
    );
    sqlx::query_as::<_, Order>(&sql)
        .bind(service_type)
        .fetch_all(pool)
        .await
}

/// Admin listing, optionally filtered by status
pub async fn list_paginated(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    match status {
        Some(status) => {
            let sql = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            );
            sqlx::query_as::<_, Order>(&sql)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
        }
        None => {
            let sql = format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
            );
            sqlx::query_as::<_, Order>(&sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
        }
    }
}
