//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, TransactionView, TransferResponse};
use crate::transfer::TransferRequest;

/// Execute a money transfer between two wallets.
///
/// POST /api/transfer
///
/// Retries with the same idempotency key replay the original result instead
/// of moving money twice.
#[utoipa::path(
    post,
    path = "/api/transfer",
    request_body(content = String, description = "fromWalletId, toWalletId, amount, idempotencyKey", content_type = "application/json"),
    responses(
        (status = 200, description = "Transfer completed (or replayed)", body = TransferResponse),
        (status = 400, description = "Validation failure or insufficient balance"),
        (status = 404, description = "Wallet not found"),
        (status = 409, description = "Duplicate or concurrently processing request"),
        (status = 500, description = "Transfer failed")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferResponse> {
    match state.coordinator.execute(&req).await {
        Ok(outcome) => Ok(Json(TransferResponse::from(outcome))),
        Err(e) => {
            if state.env != "production" {
                tracing::error!(
                    method = "POST",
                    path = "/api/transfer",
                    code = e.code(),
                    error = ?e,
                    "Transfer rejected"
                );
            } else {
                tracing::error!(
                    method = "POST",
                    path = "/api/transfer",
                    code = e.code(),
                    "Transfer rejected"
                );
            }
            Err(ApiError::from(e))
        }
    }
}

/// Look up a transfer attempt by its idempotency key.
///
/// GET /api/transfer/{key}
#[utoipa::path(
    get,
    path = "/api/transfer/{key}",
    params(("key" = String, Path, description = "Idempotency key of the transfer")),
    responses(
        (status = 200, description = "Transfer log", body = TransactionView),
        (status = 404, description = "No transfer for this key")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<TransactionView> {
    let log = state
        .ledger
        .find_log_by_key(&key)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "TRANSFER_NOT_FOUND",
                format!("no transfer for key '{}'", key),
            )
        })?;

    Ok(Json(TransactionView::from(log)))
}
