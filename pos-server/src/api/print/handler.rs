//! Print API Handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::api::json_body;
use crate::printing::{self, BatchPrint, ReceiptFormat};
use crate::state::AppState;
use crate::utils::{ApiResponse, AppError, AppResult};

/// Most orders one batch may print
const MAX_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ReceiptQuery {
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchRequest {
    pub order_ids: Vec<i64>,
}

/// Printable receipt, served as text or HTML
pub async fn receipt(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Query(query): Query<ReceiptQuery>,
) -> AppResult<Response> {
    let format = match query.format.as_deref().map(str::trim) {
        None | Some("") => ReceiptFormat::default(),
        Some(raw) => raw.parse()?,
    };
    let rendered = printing::render_receipt(&state.pool, &state.renderer, order_id, format).await?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], rendered.content).into_response())
}

/// Batch print and complete
pub async fn batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> AppResult<ApiResponse<BatchPrint>> {
    let request = json_body(payload)?;
    if request.order_ids.is_empty() {
        return Err(AppError::required("order_ids", "No orders to print"));
    }
    if request.order_ids.len() > MAX_BATCH {
        return Err(AppError::validation(format!(
            "At most {MAX_BATCH} orders per batch"
        )));
    }
    let result =
        printing::print_and_complete(&state.pool, &state.renderer, &request.order_ids).await?;
    Ok(ApiResponse::success(result))
}
