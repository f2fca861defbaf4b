//! Transfer pipeline data types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money;

/// Response message conventions.
pub const MSG_COMPLETED: &str = "Transfer completed successfully";
pub const MSG_ALREADY_PROCESSED: &str = "Transfer already processed (idempotent request)";
pub const MSG_PREVIOUSLY_FAILED: &str = "Transfer previously failed";
pub const CACHE_HIT_SUFFIX: &str = " (from cache)";

/// Wire-level transfer request.
///
/// Fields default to empty so that missing keys flow into the validator and
/// come back as categorized errors rather than deserialization failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default)]
    pub from_wallet_id: String,
    #[serde(default)]
    pub to_wallet_id: String,
    /// Amount as a string; float representations never touch the money path
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub idempotency_key: String,
}

/// A request that passed validation. The only input type the ledger accepts.
#[derive(Debug, Clone)]
pub struct ValidatedTransfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Decimal,
    pub idempotency_key: String,
}

/// Committed result of the ledger transaction.
#[derive(Debug, Clone)]
pub struct AppliedTransfer {
    pub transaction_id: Uuid,
    pub from_balance: Decimal,
    pub to_balance: Decimal,
}

/// Final observable outcome of an accepted transfer (first run or replay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub transaction_id: Uuid,
    pub message: String,
    /// Post-trade balances, fixed-point 4-digit strings
    pub from_balance: String,
    pub to_balance: String,
}

impl TransferOutcome {
    pub fn completed(applied: &AppliedTransfer) -> Self {
        Self {
            transaction_id: applied.transaction_id,
            message: MSG_COMPLETED.to_string(),
            from_balance: money::format_amount(applied.from_balance),
            to_balance: money::format_amount(applied.to_balance),
        }
    }
}

/// Serialized form of a completed transfer stored in the result cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTransfer {
    pub transaction_id: Uuid,
    pub message: String,
    pub from_balance: String,
    pub to_balance: String,
}

impl From<&TransferOutcome> for CachedTransfer {
    fn from(outcome: &TransferOutcome) -> Self {
        Self {
            transaction_id: outcome.transaction_id,
            message: outcome.message.clone(),
            from_balance: outcome.from_balance.clone(),
            to_balance: outcome.to_balance.clone(),
        }
    }
}

impl CachedTransfer {
    /// Rebuild the outcome, annotating the message as a cache hit.
    pub fn into_outcome(self) -> TransferOutcome {
        TransferOutcome {
            transaction_id: self.transaction_id,
            message: format!("{}{}", self.message, CACHE_HIT_SUFFIX),
            from_balance: self.from_balance,
            to_balance: self.to_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_transfer_roundtrip_annotates_message() {
        let outcome = TransferOutcome {
            transaction_id: Uuid::new_v4(),
            message: MSG_COMPLETED.to_string(),
            from_balance: "900.0000".to_string(),
            to_balance: "600.0000".to_string(),
        };

        let cached = CachedTransfer::from(&outcome);
        let json = serde_json::to_string(&cached).unwrap();
        let parsed: CachedTransfer = serde_json::from_str(&json).unwrap();
        let replayed = parsed.into_outcome();

        assert_eq!(replayed.transaction_id, outcome.transaction_id);
        assert_eq!(replayed.from_balance, "900.0000");
        assert_eq!(
            replayed.message,
            "Transfer completed successfully (from cache)"
        );
    }

    #[test]
    fn test_request_tolerates_missing_fields() {
        let req: TransferRequest = serde_json::from_str("{}").unwrap();
        assert!(req.from_wallet_id.is_empty());
        assert!(req.idempotency_key.is_empty());
    }
}
