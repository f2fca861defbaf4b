//! Wallet query and administration handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResult, BalanceResponse, HistoryResponse, TransactionView, WalletResponse,
};
use crate::money;
use crate::transfer::validation::parse_wallet_id;

/// Get the current balance of a wallet.
///
/// GET /api/wallet/{id}/balance
///
/// Always reads from the ledger; the cache layer is never consulted.
#[utoipa::path(
    get,
    path = "/api/wallet/{id}/balance",
    params(("id" = String, Path, description = "Wallet id (canonical UUID form)")),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 400, description = "Malformed wallet id"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<BalanceResponse> {
    let wallet_id = parse_wallet_id(&id).map_err(ApiError::from)?;

    let balance = state
        .ledger
        .wallet_balance(wallet_id)
        .await
        .map_err(|e| {
            tracing::error!(method = "GET", path = "/api/wallet/{id}/balance", error = %e, "Balance query failed");
            ApiError::from(e)
        })?
        .ok_or_else(|| ApiError::not_found(format!("wallet {} not found", wallet_id)))?;

    Ok(Json(BalanceResponse {
        wallet_id,
        balance: money::format_amount(balance),
    }))
}

/// List the most recent transactions touching a wallet.
///
/// GET /api/wallet/{id}/transactions
///
/// Returns up to 100 logs, newest first, where the wallet is source or
/// destination, regardless of status.
#[utoipa::path(
    get,
    path = "/api/wallet/{id}/transactions",
    params(("id" = String, Path, description = "Wallet id (canonical UUID form)")),
    responses(
        (status = 200, description = "Recent transactions", body = HistoryResponse),
        (status = 400, description = "Malformed wallet id")
    ),
    tag = "Wallet"
)]
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<HistoryResponse> {
    let wallet_id = parse_wallet_id(&id).map_err(ApiError::from)?;

    let logs = state
        .ledger
        .wallet_history(wallet_id)
        .await
        .map_err(|e| {
            tracing::error!(method = "GET", path = "/api/wallet/{id}/transactions", error = %e, "History query failed");
            ApiError::from(e)
        })?;

    Ok(Json(HistoryResponse {
        wallet_id,
        transactions: logs.into_iter().map(TransactionView::from).collect(),
    }))
}

/// Administrative wallet creation request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub owner_id: String,
    /// Optional opening balance; defaults to zero
    #[serde(default)]
    pub initial_balance: Option<String>,
}

/// Create a wallet (administrative path).
///
/// POST /api/wallet
#[utoipa::path(
    post,
    path = "/api/wallet",
    request_body = CreateWalletRequest,
    responses(
        (status = 201, description = "Wallet created", body = WalletResponse),
        (status = 400, description = "Invalid owner or balance, or owner already has a wallet")
    ),
    tag = "Wallet"
)]
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<WalletResponse>), ApiError> {
    if req.owner_id.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            "ownerId is required",
        ));
    }

    let initial_balance = match &req.initial_balance {
        None => rust_decimal::Decimal::ZERO,
        Some(s) => money::parse_balance(s).map_err(|_| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_AMOUNT",
                format!("'{}' is not a valid opening balance", s),
            )
        })?,
    };

    let wallet = state
        .ledger
        .create_wallet(req.owner_id.trim(), initial_balance)
        .await
        .map_err(|e| {
            tracing::error!(method = "POST", path = "/api/wallet", error = %e, "Wallet creation failed");
            ApiError::from(e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(WalletResponse {
            id: wallet.id,
            owner_id: wallet.owner_id,
            balance: money::format_amount(wallet.balance),
            version: wallet.version,
            created_at: wallet.created_at,
        }),
    ))
}
