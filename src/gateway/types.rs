//! API response types and the error mapping layer
//!
//! The gateway is the only place where [`TransferError`] becomes an HTTP
//! status. Everything below it works with categorized results.

use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ledger::models::TransactionLog;
use crate::money;
use crate::transfer::{TransferError, TransferOutcome};

// ============================================================================
// ApiError
// ============================================================================

/// Transport-level error: status code plus the categorized JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always false for errors
    pub success: bool,
    /// Stable error kind, e.g. "INSUFFICIENT_BALANCE"
    #[schema(example = "INSUFFICIENT_BALANCE")]
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "WALLET_NOT_FOUND", msg)
    }

    /// 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        let status = StatusCode::from_u16(err.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.code,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Handler return type.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Response DTOs
// ============================================================================

/// Successful transfer response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub transaction_id: Uuid,
    #[schema(example = "Transfer completed successfully")]
    pub message: String,
    /// Post-trade source balance, fixed-point 4-digit string
    #[schema(example = "900.0000")]
    pub from_balance: String,
    /// Post-trade destination balance, fixed-point 4-digit string
    #[schema(example = "600.0000")]
    pub to_balance: String,
}

impl From<TransferOutcome> for TransferResponse {
    fn from(outcome: TransferOutcome) -> Self {
        Self {
            success: true,
            transaction_id: outcome.transaction_id,
            message: outcome.message,
            from_balance: outcome.from_balance,
            to_balance: outcome.to_balance,
        }
    }
}

/// Wallet balance response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub wallet_id: Uuid,
    #[schema(example = "1000.0000")]
    pub balance: String,
}

/// One transaction log entry as exposed over the API
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: Uuid,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    #[schema(example = "100.0000")]
    pub amount: String,
    #[schema(example = "SUCCESS")]
    pub status: String,
    pub idempotency_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionLog> for TransactionView {
    fn from(log: TransactionLog) -> Self {
        Self {
            id: log.id,
            from_wallet_id: log.from_wallet_id,
            to_wallet_id: log.to_wallet_id,
            amount: money::format_amount(log.amount),
            status: log.status.as_str().to_string(),
            idempotency_key: log.idempotency_key,
            error_message: log.error_message,
            metadata: log.metadata,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}

/// Wallet history response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub wallet_id: Uuid,
    pub transactions: Vec<TransactionView>,
}

/// Wallet document (administrative creation path)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub id: Uuid,
    pub owner_id: String,
    #[schema(example = "0.0000")]
    pub balance: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub services: ServicesHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServicesHealth {
    #[schema(example = "up")]
    pub database: &'static str,
    #[schema(example = "up")]
    pub cache: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_transfer_error_mapping() {
        let err = ApiError::from(TransferError::AmountTooSmall);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "AMOUNT_TOO_SMALL");

        let err = ApiError::from(TransferError::WalletNotFound(Uuid::nil()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = ApiError::from(TransferError::ConcurrentProcessing);
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = ApiError::from(TransferError::Internal("x".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_transfer_response_shape() {
        let outcome = TransferOutcome {
            transaction_id: Uuid::nil(),
            message: "Transfer completed successfully".to_string(),
            from_balance: "900.0000".to_string(),
            to_balance: "600.0000".to_string(),
        };
        let response = TransferResponse::from(outcome);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["fromBalance"], "900.0000");
        assert_eq!(json["toBalance"], "600.0000");
        assert!(json["transactionId"].is_string());
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            success: false,
            error: "INVALID_AMOUNT",
            message: "bad".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "INVALID_AMOUNT");
    }

    #[test]
    fn test_transaction_view_formats_amount() {
        use crate::ledger::models::LogStatus;

        let log = TransactionLog {
            id: Uuid::new_v4(),
            from_wallet_id: Uuid::new_v4(),
            to_wallet_id: Uuid::new_v4(),
            amount: Decimal::from(100),
            status: LogStatus::Success,
            idempotency_key: "k".to_string(),
            error_message: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = TransactionView::from(log);
        assert_eq!(view.amount, "100.0000");
        assert_eq!(view.status, "SUCCESS");
    }
}
