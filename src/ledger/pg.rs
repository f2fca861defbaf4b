//! PostgreSQL ledger
//!
//! Implements [`LedgerStore`] with raw queries over a connection pool. The
//! transfer path runs in two parts: the PENDING log insert commits on its
//! own (so a later rollback cannot erase the attempt), then a single READ
//! COMMITTED transaction takes both wallet row locks in ascending-id order,
//! validates, moves the money, and finalizes the log to SUCCESS.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::models::{LogStatus, TransactionLog, Wallet};
use super::{LedgerStore, lock_order};
use crate::money;
use crate::transfer::error::TransferError;
use crate::transfer::types::{AppliedTransfer, ValidatedTransfer};

/// Cap for persisted error messages.
const ERROR_MESSAGE_MAX: usize = 1024;

/// History listing cap; no pagination beyond it.
const HISTORY_LIMIT: i64 = 100;

const LOG_COLUMNS: &str = "id, from_wallet_id, to_wallet_id, amount, status, idempotency_key, \
                           error_message, metadata, created_at, updated_at";

pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert the PENDING log in its own committed statement.
    ///
    /// The unique constraint on `idempotency_key` is the durable dedup tier:
    /// a violation means the key was already used, whatever its status.
    async fn insert_pending(&self, transfer: &ValidatedTransfer) -> Result<Uuid, TransferError> {
        let metadata = serde_json::json!({ "requestedAt": Utc::now().to_rfc3339() });

        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO transaction_logs
                (id, from_wallet_id, to_wallet_id, amount, status, idempotency_key, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(transfer.from)
        .bind(transfer.to)
        .bind(transfer.amount)
        .bind(LogStatus::Pending.as_str())
        .bind(&transfer.idempotency_key)
        .bind(&metadata)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(e) if is_unique_violation(&e) => Err(TransferError::DuplicateRequest(
                "idempotency key already used".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// The atomic debit/credit transaction. Runs after [`Self::insert_pending`]
    /// committed; any error here rolls back wallet updates and the SUCCESS
    /// marking while the PENDING row survives for the failure recorder.
    async fn run_transfer_tx(
        &self,
        log_id: Uuid,
        transfer: &ValidatedTransfer,
    ) -> Result<AppliedTransfer, TransferError> {
        let mut tx = self.pool.begin().await?;

        // Row locks always in ascending wallet-id order (deadlock freedom).
        let (first_id, second_id) = lock_order(transfer.from, transfer.to);

        let first = sqlx::query(
            "SELECT id, owner_id, balance, version, created_at, updated_at \
             FROM wallets WHERE id = $1 FOR UPDATE",
        )
        .bind(first_id)
        .fetch_optional(&mut *tx)
        .await?;

        let second = sqlx::query(
            "SELECT id, owner_id, balance, version, created_at, updated_at \
             FROM wallets WHERE id = $1 FOR UPDATE",
        )
        .bind(second_id)
        .fetch_optional(&mut *tx)
        .await?;

        let first = match first {
            Some(row) => row_to_wallet(&row)?,
            None => return Err(TransferError::WalletNotFound(first_id)),
        };
        let second = match second {
            Some(row) => row_to_wallet(&row)?,
            None => return Err(TransferError::WalletNotFound(second_id)),
        };

        // Resolve logical roles now that both rows are held.
        let (from_wallet, to_wallet) = if first.id == transfer.from {
            (first, second)
        } else {
            (second, first)
        };

        if from_wallet.balance < transfer.amount {
            return Err(TransferError::InsufficientBalance {
                available: from_wallet.balance,
                required: transfer.amount,
            });
        }

        let new_from = from_wallet.balance - transfer.amount;
        let new_to = to_wallet.balance + transfer.amount;

        sqlx::query(
            "UPDATE wallets SET balance = $1, version = version + 1, updated_at = NOW() \
             WHERE id = $2",
        )
        .bind(new_from)
        .bind(from_wallet.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE wallets SET balance = $1, version = version + 1, updated_at = NOW() \
             WHERE id = $2",
        )
        .bind(new_to)
        .bind(to_wallet.id)
        .execute(&mut *tx)
        .await?;

        let completion = serde_json::json!({
            "completedAt": Utc::now().to_rfc3339(),
            "fromBalanceAfter": money::format_amount(new_from),
            "toBalanceAfter": money::format_amount(new_to),
        });

        sqlx::query(
            "UPDATE transaction_logs \
             SET status = $1, metadata = metadata || $2, updated_at = NOW() \
             WHERE id = $3 AND status = $4",
        )
        .bind(LogStatus::Success.as_str())
        .bind(&completion)
        .bind(log_id)
        .bind(LogStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %log_id,
            from = %transfer.from,
            to = %transfer.to,
            amount = %transfer.amount,
            "Transfer committed"
        );

        Ok(AppliedTransfer {
            transaction_id: log_id,
            from_balance: new_from,
            to_balance: new_to,
        })
    }
}

#[async_trait]
impl LedgerStore for PgLedger {
    async fn execute_transfer(
        &self,
        transfer: &ValidatedTransfer,
    ) -> Result<AppliedTransfer, TransferError> {
        let log_id = self.insert_pending(transfer).await?;
        self.run_transfer_tx(log_id, transfer).await
    }

    async fn find_log_by_key(
        &self,
        key: &str,
    ) -> Result<Option<TransactionLog>, TransferError> {
        let row = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM transaction_logs WHERE idempotency_key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_log(&r)).transpose()
    }

    async fn record_failure(&self, key: &str, message: &str) -> Result<(), TransferError> {
        let truncated: String = message.chars().take(ERROR_MESSAGE_MAX).collect();
        let patch = serde_json::json!({ "failedAt": Utc::now().to_rfc3339() });

        let result = sqlx::query(
            "UPDATE transaction_logs \
             SET status = $1, error_message = $2, metadata = metadata || $3, updated_at = NOW() \
             WHERE idempotency_key = $4 AND status = $5",
        )
        .bind(LogStatus::Failed.as_str())
        .bind(&truncated)
        .bind(&patch)
        .bind(key)
        .bind(LogStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(idempotency_key = %key, "No pending log to mark failed");
        }
        Ok(())
    }

    async fn wallet_balance(&self, wallet_id: Uuid) -> Result<Option<Decimal>, TransferError> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            "SELECT balance FROM wallets WHERE id = $1",
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    async fn wallet_history(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<TransactionLog>, TransferError> {
        let rows = sqlx::query(&format!(
            "SELECT {LOG_COLUMNS} FROM transaction_logs \
             WHERE from_wallet_id = $1 OR to_wallet_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        ))
        .bind(wallet_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_log).collect()
    }

    async fn create_wallet(
        &self,
        owner_id: &str,
        initial_balance: Decimal,
    ) -> Result<Wallet, TransferError> {
        let result = sqlx::query(
            "INSERT INTO wallets (id, owner_id, balance) VALUES ($1, $2, $3) \
             RETURNING id, owner_id, balance, version, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(initial_balance)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row_to_wallet(&row),
            Err(e) if is_unique_violation(&e) => Err(TransferError::ValidationError(format!(
                "wallet already exists for owner '{}'",
                owner_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn row_to_wallet(row: &PgRow) -> Result<Wallet, TransferError> {
    Ok(Wallet {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        balance: row.get("balance"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_log(row: &PgRow) -> Result<TransactionLog, TransferError> {
    let status_str: String = row.get("status");
    let status = LogStatus::parse(&status_str).ok_or_else(|| {
        TransferError::Internal(format!("invalid log status in store: {}", status_str))
    })?;

    Ok(TransactionLog {
        id: row.get("id"),
        from_wallet_id: row.get("from_wallet_id"),
        to_wallet_id: row.get("to_wallet_id"),
        amount: row.get("amount"),
        status,
        idempotency_key: row.get("idempotency_key"),
        error_message: row.get("error_message"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
