//! Payment operations behind `/api/payment`

use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderStatus, PaymentStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::callback::apply_gateway_status;
use super::{GatewayQuery, KPayGateway, METHOD_CASH, METHOD_KPAY, PaymentInit, map_status};
use crate::error::ServiceResult;
use crate::orders::state_machine::{self, Applied, OrderRef};
use crate::utils::{AppError, ErrorCode};

/// Local payment fields of an order
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub order_no: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub kpay_transaction_id: Option<String>,
    pub paid_at: Option<String>,
}

impl From<Order> for PaymentView {
    fn from(o: Order) -> Self {
        Self {
            order_no: o.order_no,
            status: o.status,
            payment_status: o.payment_status,
            payment_method: o.payment_method,
            kpay_transaction_id: o.kpay_transaction_id,
            paid_at: o.paid_at,
        }
    }
}

/// Gateway view plus what reconciliation changed locally
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub gateway: GatewayQuery,
    pub applied: bool,
    pub payment: PaymentView,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockPaymentRequest {
    pub order_no: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Start a payment; refuses orders that are already paid or cancelled
pub async fn create_payment(
    pool: &SqlitePool,
    gateway: &KPayGateway,
    order_no: &str,
) -> ServiceResult<PaymentInit> {
    let mut conn = pool.acquire().await?;
    let order = state_machine::load(&mut conn, OrderRef::OrderNo(order_no)).await?;
    drop(conn);

    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid)
            .with_detail("order_no", order_no)
            .into());
    }
    if order.status == OrderStatus::Cancelled {
        return Err(AppError::new(ErrorCode::OrderAlreadyCancelled)
            .with_detail("order_no", order_no)
            .into());
    }

    Ok(gateway.create_payment(&order).await?)
}

pub async fn payment_view(pool: &SqlitePool, order_no: &str) -> ServiceResult<PaymentView> {
    let mut conn = pool.acquire().await?;
    let order = state_machine::load(&mut conn, OrderRef::OrderNo(order_no)).await?;
    Ok(order.into())
}

/// Ask the gateway, then apply its answer like a callback would
pub async fn reconcile(
    pool: &SqlitePool,
    gateway: &KPayGateway,
    order_no: &str,
) -> ServiceResult<Reconciliation> {
    // existence check before the outbound call
    {
        let mut conn = pool.acquire().await?;
        state_machine::load(&mut conn, OrderRef::OrderNo(order_no)).await?;
    }

    let query = gateway.query_order(order_no).await?;
    let target = query.trade_status.as_deref().and_then(map_status);

    let mut tx = pool.begin().await?;
    let order = state_machine::load(&mut tx, OrderRef::OrderNo(order_no)).await?;
    let applied = match target {
        Some(status) => {
            apply_gateway_status(
                &mut tx,
                &order,
                status,
                query.transaction_id.as_deref(),
                METHOD_KPAY,
                gateway.config().completes_order,
            )
            .await?
        }
        None => Applied::default(),
    };
    let updated = state_machine::load(&mut tx, OrderRef::Id(order.id)).await?;
    tx.commit().await?;

    tracing::info!(
        order_no,
        gateway_status = query.trade_status.as_deref().unwrap_or("-"),
        applied = applied.payment_changed,
        "Payment reconciled"
    );

    Ok(Reconciliation {
        gateway: query,
        applied: applied.payment_changed || applied.status_changed,
        payment: updated.into(),
    })
}

/// Mark an order paid without a gateway (mock mode only)
pub async fn mock_success(
    pool: &SqlitePool,
    gateway: &KPayGateway,
    request: MockPaymentRequest,
) -> ServiceResult<PaymentView> {
    if !gateway.config().mock_mode {
        return Err(AppError::new(ErrorCode::PaymentMockDisabled).into());
    }

    let method = request
        .payment_method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(METHOD_KPAY);
    let (method, prefix) = match method {
        METHOD_KPAY => (METHOD_KPAY, "MOCK"),
        METHOD_CASH => (METHOD_CASH, "CASH"),
        other => {
            return Err(AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                format!("Unsupported payment method: {other}"),
            )
            .with_detail("payment_method", other)
            .into());
        }
    };
    let transaction_id = format!("{prefix}_{}", now_millis());

    let mut tx = pool.begin().await?;
    let order = state_machine::load(&mut tx, OrderRef::OrderNo(&request.order_no)).await?;
    apply_gateway_status(
        &mut tx,
        &order,
        PaymentStatus::Paid,
        Some(&transaction_id),
        method,
        // cash is settled at the counter; the kitchen flow is unchanged
        method == METHOD_KPAY && gateway.config().completes_order,
    )
    .await?;
    let updated = state_machine::load(&mut tx, OrderRef::Id(order.id)).await?;
    tx.commit().await?;

    tracing::info!(order_no = %updated.order_no, method, "Mock payment succeeded");
    Ok(updated.into())
}
