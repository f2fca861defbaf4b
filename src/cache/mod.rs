//! Cache/lock store contract
//!
//! The auxiliary key/value store backs two concerns: caching completed
//! transfer results and holding short-lived mutex leases. The ledger stays
//! authoritative, so every operation here is allowed to fail without
//! compromising correctness; callers degrade instead of propagating.

pub mod memory;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use memory::InMemoryCache;

/// Cache store failure. Callers treat these as a degraded-mode signal,
/// never as a request-fatal error.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with TTL semantics.
///
/// `set_nx` is the atomic set-if-absent primitive the distributed lease is
/// built on; an implementation must guarantee at most one concurrent caller
/// observes `true` for a live key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Set `key` iff absent (or expired). Returns whether the write won.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

/// Namespaced cache key builder.
///
/// Every key the service writes carries the configured prefix so that
/// multiple deployments can share one store.
#[derive(Debug, Clone)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// Key holding a serialized completed-transfer result.
    pub fn idempotency(&self, key: &str) -> String {
        format!("{}idempotency:{}", self.prefix, key)
    }

    /// Key holding the mutex lease for an in-flight transfer.
    pub fn lock(&self, key: &str) -> String {
        format!("{}lock:{}", self.prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = CacheKeys::new("wallet:");
        assert_eq!(keys.idempotency("t1"), "wallet:idempotency:t1");
        assert_eq!(keys.lock("t1"), "wallet:lock:t1");
    }

    #[test]
    fn test_empty_prefix() {
        let keys = CacheKeys::new("");
        assert_eq!(keys.idempotency("k"), "idempotency:k");
    }
}
