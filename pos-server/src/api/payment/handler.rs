//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::api::json_body;
use crate::payment::callback::{CallbackOutcome, handle_callback};
use crate::payment::service::{self, MockPaymentRequest, PaymentView, Reconciliation};
use crate::payment::PaymentInit;
use crate::state::AppState;
use crate::utils::{ApiResponse, AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePaymentRequest {
    pub order_no: String,
}

/// Start a payment for an unpaid order
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PaymentInit>> {
    let request = json_body(payload)?;
    let order_no = request.order_no.trim();
    if order_no.is_empty() {
        return Err(AppError::required("order_no", "Order number is required"));
    }
    let init = service::create_payment(&state.pool, &state.gateway, order_no).await?;
    Ok(ApiResponse::success(init))
}

/// Gateway callback
///
/// Must receive the raw body: the signature covers the exact field values.
pub async fn callback(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<ApiResponse<CallbackOutcome>> {
    let outcome = handle_callback(&state.pool, &state.gateway, &body).await?;
    Ok(ApiResponse::success(outcome))
}

pub async fn status(
    State(state): State<AppState>,
    Path(order_no): Path<String>,
) -> AppResult<ApiResponse<PaymentView>> {
    let view = service::payment_view(&state.pool, &order_no).await?;
    Ok(ApiResponse::success(view))
}

/// Query the gateway and apply its answer
pub async fn reconcile(
    State(state): State<AppState>,
    Path(order_no): Path<String>,
) -> AppResult<ApiResponse<Reconciliation>> {
    let result = service::reconcile(&state.pool, &state.gateway, &order_no).await?;
    Ok(ApiResponse::success(result))
}

/// Development only
pub async fn mock_success(
    State(state): State<AppState>,
    payload: Result<Json<MockPaymentRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PaymentView>> {
    let request = json_body(payload)?;
    let view = service::mock_success(&state.pool, &state.gateway, request).await?;
    Ok(ApiResponse::success(view))
}
