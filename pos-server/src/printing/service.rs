//! Print operations
//!
//! Rendering is read-only apart from `is_printed`. Batch printing is the one
//! place where printing also finishes an order ("print = done"), so it is a
//! separate, explicitly named operation.

use serde::Serialize;
use shared::models::OrderStatus;
use sqlx::SqlitePool;

use super::renderer::{ReceiptFormat, ReceiptRenderer};
use crate::db::orders;
use crate::error::ServiceResult;
use crate::orders::state_machine::{self, OrderRef};
use crate::utils::time;

/// One rendered receipt
#[derive(Debug, Clone, Serialize)]
pub struct RenderedReceipt {
    pub order_id: i64,
    pub order_no: String,
    pub format: ReceiptFormat,
    pub content: String,
}

/// Outcome of `print_and_complete`
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchPrint {
    pub printed: Vec<RenderedReceipt>,
    /// Ids that did not resolve to an order
    pub skipped: Vec<i64>,
    /// Orders moved to completed by this batch
    pub completed: Vec<i64>,
}

/// Render one order; non-kitchen formats set `is_printed`
pub async fn render_receipt(
    pool: &SqlitePool,
    renderer: &ReceiptRenderer,
    order_id: i64,
    format: ReceiptFormat,
) -> ServiceResult<RenderedReceipt> {
    let mut conn = pool.acquire().await?;
    let order = state_machine::load(&mut conn, OrderRef::Id(order_id)).await?;
    let items = orders::find_items(&mut *conn, order.id).await?;

    let content = renderer.render(&order, &items, format);

    if format.marks_printed() && !order.is_printed {
        orders::mark_printed(&mut *conn, order.id).await?;
    }

    Ok(RenderedReceipt {
        order_id: order.id,
        order_no: order.order_no,
        format,
        content,
    })
}

/// Batch print: render customer receipts, mark them printed and complete
/// every order that is still open
///
/// Missing ids are skipped. Cancelled orders are printed but stay cancelled;
/// completed orders keep their original `completed_at`.
pub async fn print_and_complete(
    pool: &SqlitePool,
    renderer: &ReceiptRenderer,
    order_ids: &[i64],
) -> ServiceResult<BatchPrint> {
    let mut result = BatchPrint::default();
    let mut tx = pool.begin().await?;

    for &order_id in order_ids {
        let Some(order) = orders::find_by_id(&mut *tx, order_id).await? else {
            tracing::warn!(order_id, "Batch print: order not found, skipped");
            result.skipped.push(order_id);
            continue;
        };
        let items = orders::find_items(&mut *tx, order.id).await?;
        let content = renderer.render(&order, &items, ReceiptFormat::Customer);

        orders::mark_printed(&mut *tx, order.id).await?;
        if !order.status.is_terminal() {
            let now = time::now_local_string();
            orders::update_status(&mut *tx, order.id, OrderStatus::Completed, Some(&now)).await?;
            result.completed.push(order.id);
        }

        result.printed.push(RenderedReceipt {
            order_id: order.id,
            order_no: order.order_no,
            format: ReceiptFormat::Customer,
            content,
        });
    }

    tx.commit().await?;

    tracing::info!(
        printed = result.printed.len(),
        completed = result.completed.len(),
        skipped = result.skipped.len(),
        "Batch print finished"
    );
    Ok(result)
}
