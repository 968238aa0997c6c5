//! Verified payment callback log
//!
//! One row per (transaction_id, trade_status). A replayed callback hits the
//! unique constraint and is reported as a duplicate.

use sqlx::sqlite::SqliteExecutor;

/// Record a verified callback; returns `false` when it was already recorded
pub async fn record<'e>(
    exec: impl SqliteExecutor<'e>,
    order_no: &str,
    transaction_id: &str,
    trade_status: &str,
    payload: &str,
    received_at: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO payment_callbacks (order_no, transaction_id, trade_status, payload, received_at)
         VALUES (?, ?, ?, ?, ?) ON CONFLICT (transaction_id, trade_status) DO NOTHING",
    )
    .bind(order_no)
    .bind(transaction_id)
    .bind(trade_status)
    .bind(payload)
    .bind(received_at)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_for_order<'e>(
    exec: impl SqliteExecutor<'e>,
    order_no: &str,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM payment_callbacks WHERE order_no = ?")
            .bind(order_no)
            .fetch_one(exec)
            .await?;
    Ok(count)
}
