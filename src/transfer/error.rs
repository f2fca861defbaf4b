//! Transfer error types
//!
//! Every failure on the transfer and query paths is one of these categorized
//! outcomes. The HTTP gateway is the only layer that turns them into
//! transport codes.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Transfer error kinds.
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation errors (before any I/O) ===
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount is below the minimum transferable unit (0.0001)")]
    AmountTooSmall,

    #[error("Invalid wallet id: {0}")]
    InvalidWalletId(String),

    #[error("Source and destination wallet cannot be the same")]
    SameWalletTransfer,

    // === Ledger errors ===
    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    #[error("{0}")]
    ValidationError(String),

    // === Idempotency errors ===
    #[error("Duplicate request: {0}")]
    DuplicateRequest(String),

    #[error("Transfer is being processed")]
    ConcurrentProcessing,

    // === System errors ===
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransferError {
    /// Stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidRequest(_) => "INVALID_REQUEST",
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::AmountTooSmall => "AMOUNT_TOO_SMALL",
            TransferError::InvalidWalletId(_) => "INVALID_WALLET_ID",
            TransferError::SameWalletTransfer => "SAME_WALLET_TRANSFER",
            TransferError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            TransferError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TransferError::ValidationError(_) => "VALIDATION_ERROR",
            TransferError::DuplicateRequest(_) => "DUPLICATE_REQUEST",
            TransferError::ConcurrentProcessing => "CONCURRENT_PROCESSING",
            TransferError::TransferFailed(_) => "TRANSFER_FAILED",
            TransferError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for the gateway layer.
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidRequest(_)
            | TransferError::InvalidAmount(_)
            | TransferError::AmountTooSmall
            | TransferError::InvalidWalletId(_)
            | TransferError::SameWalletTransfer
            | TransferError::InsufficientBalance { .. }
            | TransferError::ValidationError(_) => 400,
            TransferError::WalletNotFound(_) => 404,
            TransferError::DuplicateRequest(_) | TransferError::ConcurrentProcessing => 409,
            TransferError::TransferFailed(_) | TransferError::Internal(_) => 500,
        }
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(e: sqlx::Error) -> Self {
        TransferError::Internal(format!("database error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TransferError::SameWalletTransfer.code(), "SAME_WALLET_TRANSFER");
        assert_eq!(TransferError::AmountTooSmall.code(), "AMOUNT_TOO_SMALL");
        assert_eq!(
            TransferError::InsufficientBalance {
                available: Decimal::from(500),
                required: Decimal::from(2000),
            }
            .code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(TransferError::ConcurrentProcessing.code(), "CONCURRENT_PROCESSING");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(TransferError::InvalidAmount("x".into()).http_status(), 400);
        assert_eq!(TransferError::WalletNotFound(Uuid::nil()).http_status(), 404);
        assert_eq!(TransferError::DuplicateRequest("k".into()).http_status(), 409);
        assert_eq!(TransferError::ConcurrentProcessing.http_status(), 409);
        assert_eq!(TransferError::Internal("boom".into()).http_status(), 500);
    }

    #[test]
    fn test_insufficient_balance_mentions_both_values() {
        let err = TransferError::InsufficientBalance {
            available: Decimal::new(5_000_000, 4),
            required: Decimal::from(2000),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"), "available missing: {msg}");
        assert!(msg.contains("2000"), "required missing: {msg}");
    }
}
