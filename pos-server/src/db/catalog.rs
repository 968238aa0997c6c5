//! Catalog reads used at order time (tables, products, options)
//!
//! The ordering core never edits catalog rows, except flipping a table to
//! occupied when a dine-in order commits.

use shared::models::{DiningTable, Product, ProductOption, TableStatus};
use sqlx::sqlite::SqliteExecutor;

pub async fn find_table_by_number<'e>(
    exec: impl SqliteExecutor<'e>,
    table_number: &str,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as::<_, DiningTable>(
        "SELECT id, table_number, qr_code, status FROM dining_tables WHERE table_number = ?",
    )
    .bind(table_number)
    .fetch_optional(exec)
    .await
}

pub async fn find_table_by_id<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<DiningTable>, sqlx::Error> {
    sqlx::query_as::<_, DiningTable>(
        "SELECT id, table_number, qr_code, status FROM dining_tables WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(exec)
    .await
}

pub async fn set_table_status<'e>(
    exec: impl SqliteExecutor<'e>,
    table_id: i64,
    status: TableStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE dining_tables SET status = ? WHERE id = ?")
        .bind(status)
        .bind(table_id)
        .execute(exec)
        .await?;
    Ok(())
}

/// Product by id, regardless of availability
pub async fn find_product<'e>(
    exec: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "SELECT id, category_id, name_zh, name_my, name_en, price, is_available, sort_order FROM products WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(exec)
    .await
}

/// Option by id, scoped to its owning product
pub async fn find_option<'e>(
    exec: impl SqliteExecutor<'e>,
    product_id: i64,
    option_id: i64,
) -> Result<Option<ProductOption>, sqlx::Error> {
    sqlx::query_as::<_, ProductOption>(
        "SELECT id, product_id, option_type, name_zh, name_my, name_en, extra_price, is_default, sort_order FROM product_options WHERE id = ? AND product_id = ?",
    )
    .bind(option_id)
    .bind(product_id)
    .fetch_optional(exec)
    .await
}
