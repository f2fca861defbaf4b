//! Idempotency coordinator
//!
//! Guards every transfer with three layers, in order: the result cache, the
//! distributed mutex lease, and the ledger's unique constraint on the
//! idempotency key. The cache layer is advisory; the ledger stays
//! authoritative, so any cache failure degrades the request instead of
//! failing it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::error::TransferError;
use super::types::{
    CachedTransfer, MSG_ALREADY_PROCESSED, MSG_PREVIOUSLY_FAILED, TransferOutcome,
    TransferRequest, ValidatedTransfer,
};
use super::validation;
use crate::cache::{CacheKeys, CacheStore};
use crate::config::AppConfig;
use crate::ledger::{LedgerStore, LogStatus, TransactionLog};

/// Tuning for the idempotency tiers.
#[derive(Debug, Clone)]
pub struct IdempotencyConfig {
    /// TTL for cached transfer results
    pub result_ttl: Duration,
    /// TTL of the mutex lease (auto-release under process loss)
    pub lock_ttl: Duration,
    pub lock_retry_attempts: u32,
    pub lock_retry_delay: Duration,
    /// Deadline for the ledger execution step
    pub request_timeout: Duration,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            result_ttl: Duration::from_secs(86_400),
            lock_ttl: Duration::from_secs(30),
            lock_retry_attempts: 50,
            lock_retry_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&AppConfig> for IdempotencyConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            result_ttl: Duration::from_secs(config.cache.idempotency_ttl_secs),
            lock_ttl: Duration::from_secs(config.lease.ttl_secs),
            lock_retry_attempts: config.lease.retry_attempts,
            lock_retry_delay: Duration::from_millis(config.lease.retry_delay_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

/// How the lease acquisition round ended.
enum LeaseOutcome {
    /// This request holds the lease and must release it on exit
    Held,
    /// Cache failed; proceed unguarded, tiers 1 and 3 anchor correctness
    FailOpen,
    /// Retry budget exhausted against a live holder
    Contended,
}

/// Orchestrates validation, the three dedup tiers, the ledger executor and
/// the failure recorder for each transfer attempt.
pub struct TransferCoordinator {
    ledger: Arc<dyn LedgerStore>,
    cache: Arc<dyn CacheStore>,
    keys: CacheKeys,
    config: IdempotencyConfig,
}

impl TransferCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        cache: Arc<dyn CacheStore>,
        keys: CacheKeys,
        config: IdempotencyConfig,
    ) -> Self {
        Self {
            ledger,
            cache,
            keys,
            config,
        }
    }

    /// Execute a transfer request end to end.
    pub async fn execute(&self, req: &TransferRequest) -> Result<TransferOutcome, TransferError> {
        // Validation is pure and runs before any I/O
        let transfer = validation::validate(req)?;
        let key = transfer.idempotency_key.clone();

        // Tier 1: result cache
        if let Some(outcome) = self.cached_result(&key).await {
            info!(idempotency_key = %key, "Transfer replayed from cache");
            return Ok(outcome);
        }

        // Tier 2: distributed mutex lease
        match self.acquire_lease(&key).await {
            LeaseOutcome::Held => {
                let result = self.run_guarded(&transfer).await;
                self.release_lease(&key).await;
                result
            }
            LeaseOutcome::FailOpen => {
                // Never acquired, so nothing to release (and deleting the key
                // could evict another holder's lease)
                self.run_guarded(&transfer).await
            }
            LeaseOutcome::Contended => {
                debug!(idempotency_key = %key, "Lease contended, falling back to ledger lookup");
                match self.ledger.find_log_by_key(&key).await? {
                    Some(log) => self.replay(log).await,
                    None => Err(TransferError::ConcurrentProcessing),
                }
            }
        }
    }

    /// The section that runs while the lease (if any) is held: ledger lookup
    /// by key, executor under the request deadline, cache population, and
    /// failure recording.
    async fn run_guarded(
        &self,
        transfer: &ValidatedTransfer,
    ) -> Result<TransferOutcome, TransferError> {
        let key = &transfer.idempotency_key;

        // Tier 2.5: a prior attempt may have finished while we waited
        if let Some(log) = self.ledger.find_log_by_key(key).await? {
            return self.replay(log).await;
        }

        let executed =
            tokio::time::timeout(self.config.request_timeout, self.ledger.execute_transfer(transfer))
                .await;

        match executed {
            Err(_elapsed) => {
                let err = TransferError::TransferFailed("transfer deadline exceeded".to_string());
                self.record_failure(key, &err).await;
                Err(err)
            }
            // Tier 3: the unique constraint caught a racing insert
            Ok(Err(TransferError::DuplicateRequest(reason))) => {
                match self.ledger.find_log_by_key(key).await? {
                    Some(log) => self.replay(log).await,
                    None => Err(TransferError::DuplicateRequest(reason)),
                }
            }
            Ok(Err(err)) => {
                self.record_failure(key, &err).await;
                Err(err)
            }
            Ok(Ok(applied)) => {
                let outcome = TransferOutcome::completed(&applied);
                self.store_result(key, &outcome).await;
                Ok(outcome)
            }
        }
    }

    /// Reconstruct the observable result of an existing log.
    async fn replay(&self, log: TransactionLog) -> Result<TransferOutcome, TransferError> {
        match log.status {
            LogStatus::Success => {
                let from_balance = log
                    .metadata_str("fromBalanceAfter")
                    .ok_or_else(|| missing_metadata(&log))?
                    .to_string();
                let to_balance = log
                    .metadata_str("toBalanceAfter")
                    .ok_or_else(|| missing_metadata(&log))?
                    .to_string();

                let outcome = TransferOutcome {
                    transaction_id: log.id,
                    message: MSG_ALREADY_PROCESSED.to_string(),
                    from_balance,
                    to_balance,
                };
                // Backfill the cache for the next replay
                self.store_result(&log.idempotency_key, &outcome).await;
                info!(
                    idempotency_key = %log.idempotency_key,
                    transaction_id = %log.id,
                    "Transfer replayed from ledger"
                );
                Ok(outcome)
            }
            LogStatus::Pending => Err(TransferError::ConcurrentProcessing),
            LogStatus::Failed => Err(TransferError::DuplicateRequest(
                MSG_PREVIOUSLY_FAILED.to_string(),
            )),
        }
    }

    /// Tier 1 lookup. Errors and decode failures degrade to a miss.
    async fn cached_result(&self, key: &str) -> Option<TransferOutcome> {
        let cache_key = self.keys.idempotency(key);
        match self.cache.get(&cache_key).await {
            Ok(Some(serialized)) => match serde_json::from_str::<CachedTransfer>(&serialized) {
                Ok(cached) => Some(cached.into_outcome()),
                Err(e) => {
                    warn!(key = %cache_key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Cache read failed, degrading to ledger");
                None
            }
        }
    }

    /// Bounded lease acquisition with fail-open on cache errors.
    async fn acquire_lease(&self, key: &str) -> LeaseOutcome {
        let lock_key = self.keys.lock(key);
        let stamp = Utc::now().timestamp_millis().to_string();

        for attempt in 1..=self.config.lock_retry_attempts {
            match self.cache.set_nx(&lock_key, &stamp, self.config.lock_ttl).await {
                Ok(true) => {
                    debug!(key = %lock_key, attempt, "Lease acquired");
                    return LeaseOutcome::Held;
                }
                Ok(false) => {
                    if attempt < self.config.lock_retry_attempts {
                        tokio::time::sleep(self.config.lock_retry_delay).await;
                    }
                }
                Err(e) => {
                    warn!(key = %lock_key, error = %e, "Lease store failed, proceeding fail-open");
                    return LeaseOutcome::FailOpen;
                }
            }
        }

        LeaseOutcome::Contended
    }

    /// Best-effort lease release; the TTL is the backstop.
    async fn release_lease(&self, key: &str) {
        let lock_key = self.keys.lock(key);
        if let Err(e) = self.cache.delete(&lock_key).await {
            warn!(key = %lock_key, error = %e, "Lease release failed, TTL will expire it");
        }
    }

    /// Best-effort result cache population.
    async fn store_result(&self, key: &str, outcome: &TransferOutcome) {
        let cache_key = self.keys.idempotency(key);
        let cached = CachedTransfer::from(outcome);
        match serde_json::to_string(&cached) {
            Ok(serialized) => {
                if let Err(e) = self
                    .cache
                    .set(&cache_key, &serialized, self.config.result_ttl)
                    .await
                {
                    warn!(key = %cache_key, error = %e, "Result cache write failed");
                }
            }
            Err(e) => warn!(key = %cache_key, error = %e, "Result serialization failed"),
        }
    }

    /// Best-effort FAILED bookkeeping; never alters the returned error.
    async fn record_failure(&self, key: &str, err: &TransferError) {
        if let Err(record_err) = self.ledger.record_failure(key, &err.to_string()).await {
            warn!(
                idempotency_key = %key,
                error = %record_err,
                "Failed to record transfer failure"
            );
        }
    }
}

fn missing_metadata(log: &TransactionLog) -> TransferError {
    TransferError::Internal(format!(
        "success log {} is missing balance metadata",
        log.id
    ))
}
