//! Inbound payment callback
//!
//! Order of operations:
//! 1. Parse the body into a flat key/value map (nothing nested)
//! 2. Verify `sign` over every other field; reject before any write
//! 3. Record `(transaction_id, status)`; a replay stops here
//! 4. Map the gateway status and funnel it through the state machine

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use shared::models::{Order, OrderStatus, PaymentStatus};
use sqlx::{SqliteConnection, SqlitePool};

use super::signature::SIGN_FIELD;
use super::{KPayGateway, METHOD_KPAY, map_status};
use crate::db::callbacks;
use crate::error::ServiceResult;
use crate::orders::state_machine::{self, Applied, OrderRef, TransitionRequest, TransitionSource};
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode, time};

const ORDER_NO_FIELD: &str = "merch_order_id";
const TRANSACTION_FIELDS: &[&str] = &["transaction_id", "trade_no"];
const STATUS_FIELDS: &[&str] = &["status", "trade_status"];

/// A parsed, not yet verified callback
#[derive(Debug, Clone)]
pub struct CallbackPayload {
    /// Every field, `sign` included
    pub params: BTreeMap<String, String>,
}

/// A callback whose signature checked out
#[derive(Debug, Clone)]
pub struct VerifiedCallback {
    pub order_no: String,
    pub transaction_id: String,
    pub status: String,
    payload: String,
}

/// What handling a callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackOutcome {
    Applied,
    /// Already in the target state; nothing written
    NoChange,
    /// Same transaction + status seen before
    Duplicate,
    /// Status token is not final
    Ignored,
}

fn malformed(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::PaymentCallbackMalformed, msg)
}

impl CallbackPayload {
    /// Accept a flat JSON object of string values
    ///
    /// The gateway signs form fields as text. Re-rendering a number, bool or
    /// null could produce different text than was signed, so those are
    /// rejected instead of coerced.
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| malformed(format!("Callback body is not JSON: {e}")))?;
        let Value::Object(map) = value else {
            return Err(malformed("Callback body must be an object"));
        };

        let mut params = BTreeMap::new();
        for (key, value) in map {
            let Value::String(text) = value else {
                return Err(malformed(format!("Callback field {key} must be a string")));
            };
            params.insert(key, text);
        }
        Ok(Self { params })
    }

    fn field(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|n| self.params.get(*n))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Signature check first, then the required fields
    pub fn verify(self, gateway: &KPayGateway) -> AppResult<VerifiedCallback> {
        let order_hint = self.field(&[ORDER_NO_FIELD]).unwrap_or("-").to_string();

        let verified = match self.field(&[SIGN_FIELD]) {
            Some(sign) => gateway.verify(&self.params, sign),
            None => false,
        };
        if !verified {
            security_log!(
                "WARN",
                "payment_signature_invalid",
                order_no = order_hint.as_str()
            );
            return Err(AppError::new(ErrorCode::PaymentSignatureInvalid));
        }

        let order_no = self
            .field(&[ORDER_NO_FIELD])
            .ok_or_else(|| malformed("Missing merch_order_id"))?
            .to_string();
        let transaction_id = self
            .field(TRANSACTION_FIELDS)
            .ok_or_else(|| malformed("Missing transaction_id"))?
            .to_string();
        let status = self
            .field(STATUS_FIELDS)
            .ok_or_else(|| malformed("Missing status"))?
            .to_string();
        let payload = serde_json::to_string(&self.params)
            .map_err(|e| malformed(format!("Callback payload not serializable: {e}")))?;

        Ok(VerifiedCallback {
            order_no,
            transaction_id,
            status,
            payload,
        })
    }
}

/// Push a gateway-reported payment status through the state machine
///
/// Shared by callbacks, reconciliation and the mock endpoint.
pub(crate) async fn apply_gateway_status(
    conn: &mut SqliteConnection,
    order: &Order,
    status: PaymentStatus,
    transaction_id: Option<&str>,
    payment_method: &str,
    completes_order: bool,
) -> ServiceResult<Applied> {
    let paid = status == PaymentStatus::Paid;
    let request = TransitionRequest {
        status: (paid && completes_order).then_some(OrderStatus::Completed),
        payment_status: Some(status),
        payment_method: paid.then(|| payment_method.to_string()),
        transaction_id: if paid {
            transaction_id.map(str::to_string)
        } else {
            None
        },
    };

    let applied =
        state_machine::apply_in(conn, order, &request, TransitionSource::Gateway).await?;

    if applied.payment_changed && paid && order.status == OrderStatus::Cancelled {
        tracing::warn!(
            order_no = %order.order_no,
            transaction_id = transaction_id.unwrap_or("-"),
            "Payment received for a cancelled order, refund required"
        );
    }
    Ok(applied)
}

/// Verify and apply one callback body
pub async fn handle_callback(
    pool: &SqlitePool,
    gateway: &KPayGateway,
    body: &[u8],
) -> ServiceResult<CallbackOutcome> {
    let callback = CallbackPayload::parse(body)?.verify(gateway)?;

    let mut tx = pool.begin().await?;

    let order = match state_machine::load(&mut tx, OrderRef::OrderNo(&callback.order_no)).await {
        Ok(order) => order,
        Err(e) if e.code() == Some(ErrorCode::OrderNotFound) => {
            security_log!(
                "WARN",
                "payment_callback_unknown_order",
                order_no = callback.order_no.as_str()
            );
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let fresh = callbacks::record(
        &mut *tx,
        &callback.order_no,
        &callback.transaction_id,
        &callback.status,
        &callback.payload,
        &time::now_local_string(),
    )
    .await?;
    if !fresh {
        tracing::info!(
            order_no = %callback.order_no,
            transaction_id = %callback.transaction_id,
            "Duplicate payment callback, skipping"
        );
        return Ok(CallbackOutcome::Duplicate);
    }

    let Some(status) = map_status(&callback.status) else {
        tracing::info!(
            order_no = %callback.order_no,
            status = %callback.status,
            "Non-final payment status, acknowledged"
        );
        tx.commit().await?;
        return Ok(CallbackOutcome::Ignored);
    };

    let applied = apply_gateway_status(
        &mut tx,
        &order,
        status,
        Some(&callback.transaction_id),
        METHOD_KPAY,
        gateway.config().completes_order,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        order_no = %callback.order_no,
        transaction_id = %callback.transaction_id,
        status = %status,
        "Payment callback processed"
    );

    Ok(if applied.payment_changed || applied.status_changed {
        CallbackOutcome::Applied
    } else {
        CallbackOutcome::NoChange
    })
}
