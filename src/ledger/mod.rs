//! Ledger store seam
//!
//! The relational store is an external collaborator; this trait is its
//! contract. Production wires [`pg::PgLedger`]; coordinator tests inject a
//! mock so the three-tier idempotency protocol can be exercised without a
//! database.

pub mod models;
pub mod pg;
pub mod schema;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::transfer::error::TransferError;
use crate::transfer::types::{AppliedTransfer, ValidatedTransfer};
pub use models::{LogStatus, TransactionLog, Wallet};

/// Authoritative durable store of wallets and transaction logs.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Run the atomic debit/credit for a validated transfer.
    ///
    /// Inserts the PENDING log (durable on its own), then performs the
    /// ordered-lock transaction. A unique-key violation on the log insert
    /// surfaces as [`TransferError::DuplicateRequest`].
    async fn execute_transfer(
        &self,
        transfer: &ValidatedTransfer,
    ) -> Result<AppliedTransfer, TransferError>;

    /// Look up the transfer log for an idempotency key.
    async fn find_log_by_key(&self, key: &str)
    -> Result<Option<TransactionLog>, TransferError>;

    /// Flip the PENDING log for `key` to FAILED with an error message.
    /// Never touches balances; no-op when the log is already terminal.
    async fn record_failure(&self, key: &str, message: &str) -> Result<(), TransferError>;

    /// Current balance of a wallet, if it exists.
    async fn wallet_balance(&self, wallet_id: Uuid) -> Result<Option<Decimal>, TransferError>;

    /// Most recent logs touching a wallet (either direction), newest first.
    async fn wallet_history(&self, wallet_id: Uuid)
    -> Result<Vec<TransactionLog>, TransferError>;

    /// Administrative wallet creation.
    async fn create_wallet(
        &self,
        owner_id: &str,
        initial_balance: Decimal,
    ) -> Result<Wallet, TransferError>;

    /// Liveness probe against the store.
    async fn health_check(&self) -> bool;
}

/// Lock acquisition order for a pair of wallets.
///
/// Always lock the lower wallet id first. Holding this ordering globally
/// makes lock cycles between opposite-direction transfers on the same pair
/// impossible. `Uuid` comparison is byte-wise, which coincides with
/// lexicographic order of the canonical hyphenated form.
pub fn lock_order(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_order_is_symmetric() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(lock_order(a, b), lock_order(b, a));
    }

    #[test]
    fn test_lock_order_ascending() {
        let (first, second) = lock_order(Uuid::new_v4(), Uuid::new_v4());
        assert!(first <= second);
    }

    #[test]
    fn test_lock_order_matches_canonical_string_order() {
        for _ in 0..64 {
            let a = Uuid::new_v4();
            let b = Uuid::new_v4();
            let (first, second) = lock_order(a, b);
            assert!(first.to_string() <= second.to_string());
        }
    }
}
