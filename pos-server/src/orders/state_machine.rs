//! Order state machine
//!
//! `status` and `payment_status` move independently:
//!
//! ```text
//! status:          pending → preparing → completed
//!                        ╲           ╲
//!                         → cancelled  → cancelled
//! payment_status:  unpaid → paid | failed
//! ```
//!
//! Every request is planned against the current row first (both fields), and
//! only a fully valid plan is written. Re-applying the current value is a
//! no-op, so timestamps are never re-stamped.

use serde::Deserialize;
use shared::models::{Order, OrderStatus, PaymentStatus};
use sqlx::{SqliteConnection, SqlitePool};

use super::money::{sum_subtotals, to_f64};
use crate::db::orders::{self, PaymentUpdate};
use crate::error::ServiceResult;
use crate::utils::{AppError, AppResult, ErrorCode, time};

/// Raw status update body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl StatusUpdateRequest {
    /// Parse both fields; any unknown value fails the whole request
    pub fn validate(self) -> AppResult<TransitionRequest> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<OrderStatus>)
            .transpose()?;
        let payment_status = self
            .payment_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<PaymentStatus>)
            .transpose()?;

        if status.is_none() && payment_status.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }

        Ok(TransitionRequest {
            status,
            payment_status,
            ..Default::default()
        })
    }
}

/// A typed transition request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Recorded alongside a payment change
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

/// How the caller addresses an order
#[derive(Debug, Clone, Copy)]
pub enum OrderRef<'a> {
    Id(i64),
    OrderNo(&'a str),
}

/// Who is asking for the transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSource {
    /// Admin panel: terminal statuses are final, payment may be corrected
    Staff,
    /// Payment gateway: `paid` is sticky, terminal statuses are left alone
    Gateway,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusChange {
    status: OrderStatus,
    completed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PaymentChange {
    payment_status: PaymentStatus,
    paid_at: Option<String>,
}

/// What a transition actually changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    pub status_changed: bool,
    pub payment_changed: bool,
}

fn plan_status(
    order: &Order,
    target: OrderStatus,
    source: TransitionSource,
    now: &str,
) -> AppResult<Option<StatusChange>> {
    if order.status == target {
        return Ok(None);
    }
    if order.status.is_terminal() {
        if source == TransitionSource::Gateway {
            return Ok(None);
        }
        let code = match order.status {
            OrderStatus::Completed => ErrorCode::OrderAlreadyCompleted,
            OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
            _ => ErrorCode::StatusTransitionNotAllowed,
        };
        return Err(AppError::with_message(
            code,
            format!("Order {} is {}, cannot move to {}", order.order_no, order.status, target),
        )
        .with_detail("order_no", order.order_no.as_str()));
    }

    let completed_at = (target == OrderStatus::Completed).then(|| now.to_string());
    Ok(Some(StatusChange {
        status: target,
        completed_at,
    }))
}

fn plan_payment(
    order: &Order,
    target: PaymentStatus,
    source: TransitionSource,
    now: &str,
) -> Option<PaymentChange> {
    if order.payment_status == target {
        return None;
    }
    if source == TransitionSource::Gateway && order.payment_status == PaymentStatus::Paid {
        tracing::warn!(
            order_no = %order.order_no,
            requested = %target,
            "Ignoring gateway downgrade of a paid order"
        );
        return None;
    }

    let paid_at = (target == PaymentStatus::Paid).then(|| now.to_string());
    Some(PaymentChange {
        payment_status: target,
        paid_at,
    })
}

pub(crate) async fn load(conn: &mut SqliteConnection, target: OrderRef<'_>) -> ServiceResult<Order> {
    let found = match target {
        OrderRef::Id(id) => orders::find_by_id(&mut *conn, id).await?,
        OrderRef::OrderNo(order_no) => orders::find_by_order_no(&mut *conn, order_no).await?,
    };
    found.ok_or_else(|| not_found(target).into())
}

fn not_found(target: OrderRef<'_>) -> AppError {
    let err = AppError::new(ErrorCode::OrderNotFound);
    match target {
        OrderRef::Id(id) => err.with_detail("order_id", id),
        OrderRef::OrderNo(order_no) => err.with_detail("order_no", order_no),
    }
}

/// Plan and write a transition on an already-loaded order
///
/// Runs on the caller's connection so it can share a transaction.
pub(crate) async fn apply_in(
    conn: &mut SqliteConnection,
    order: &Order,
    request: &TransitionRequest,
    source: TransitionSource,
) -> ServiceResult<Applied> {
    let now = time::now_local_string();

    // Plan both fields before touching the row
    let status_change = match request.status {
        Some(target) => plan_status(order, target, source, &now)?,
        None => None,
    };
    let payment_change = request
        .payment_status
        .and_then(|target| plan_payment(order, target, source, &now));

    if let Some(change) = &status_change {
        orders::update_status(&mut *conn, order.id, change.status, change.completed_at.as_deref())
            .await?;
        tracing::info!(
            order_no = %order.order_no,
            from = %order.status,
            to = %change.status,
            ?source,
            "Order status changed"
        );
    }

    if let Some(change) = &payment_change {
        orders::update_payment(
            &mut *conn,
            order.id,
            PaymentUpdate {
                payment_status: change.payment_status,
                paid_at: change.paid_at.as_deref(),
                transaction_id: request.transaction_id.as_deref(),
                payment_method: request.payment_method.as_deref(),
            },
        )
        .await?;
        tracing::info!(
            order_no = %order.order_no,
            from = %order.payment_status,
            to = %change.payment_status,
            ?source,
            "Payment status changed"
        );
    }

    Ok(Applied {
        status_changed: status_change.is_some(),
        payment_changed: payment_change.is_some(),
    })
}

/// Apply a transition atomically and return the updated order
pub async fn apply(
    pool: &SqlitePool,
    target: OrderRef<'_>,
    request: &TransitionRequest,
    source: TransitionSource,
) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;
    let order = load(&mut tx, target).await?;
    apply_in(&mut tx, &order, request, source).await?;
    let updated = load(&mut tx, OrderRef::Id(order.id)).await?;
    tx.commit().await?;
    Ok(updated)
}

/// Delete one order line, recompute the total, cancel the order if it drops to zero
pub async fn remove_item(pool: &SqlitePool, item_id: i64) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let item = orders::find_item(&mut *tx, item_id).await?.ok_or_else(|| {
        AppError::new(ErrorCode::OrderItemNotFound).with_detail("item_id", item_id)
    })?;
    let order = load(&mut tx, OrderRef::Id(item.order_id)).await?;

    orders::delete_item(&mut *tx, item_id).await?;

    let remaining = orders::find_items(&mut *tx, order.id).await?;
    let total = sum_subtotals(remaining.iter().map(|i| i.subtotal));
    orders::update_total(&mut *tx, order.id, to_f64(total)).await?;

    if total.is_zero() && order.status != OrderStatus::Cancelled {
        orders::update_status(&mut *tx, order.id, OrderStatus::Cancelled, order.completed_at.as_deref())
            .await?;
        tracing::info!(order_no = %order.order_no, "Last item removed, order cancelled");
    }

    let updated = load(&mut tx, OrderRef::Id(order.id)).await?;
    tx.commit().await?;

    tracing::info!(
        order_no = %updated.order_no,
        item_id,
        total = updated.total_amount,
        "Order item removed"
    );
    Ok(updated)
}

/// Administrative purge; items are removed by cascade
pub async fn purge(pool: &SqlitePool, order_id: i64) -> ServiceResult<()> {
    if !orders::delete_order(pool, order_id).await? {
        return Err(not_found(OrderRef::Id(order_id)).into());
    }
    tracing::warn!(order_id, "Order purged");
    Ok(())
}
