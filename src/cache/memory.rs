//! In-process cache/lock store
//!
//! DashMap-backed implementation of [`CacheStore`] with real TTL semantics.
//! Expired entries are reaped lazily on access, so no background sweeper
//! task is needed.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

use super::{CacheError, CacheStore};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory cache store.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries. Test observability.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Reap after the read guard is dropped
        self.entries.remove_if(key, |_, e| e.is_expired());
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError> {
        let new_entry = CacheEntry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        // The entry guard holds the shard lock, making check-then-set atomic.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(new_entry);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(new_entry);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let cache = InMemoryCache::new();
        cache
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("k", "v", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_set_nx_only_first_wins() {
        let cache = InMemoryCache::new();
        assert!(cache.set_nx("lock", "a", Duration::from_secs(30)).await.unwrap());
        assert!(!cache.set_nx("lock", "b", Duration::from_secs(30)).await.unwrap());
        // Original holder's value is untouched
        assert_eq!(cache.get("lock").await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_set_nx_reclaims_expired() {
        let cache = InMemoryCache::new();
        assert!(cache.set_nx("lock", "a", Duration::from_millis(10)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(cache.set_nx("lock", "b", Duration::from_secs(30)).await.unwrap());
        assert_eq!(cache.get("lock").await.unwrap(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_delete_releases_key() {
        let cache = InMemoryCache::new();
        cache
            .set_nx("lock", "a", Duration::from_secs(30))
            .await
            .unwrap();
        cache.delete("lock").await.unwrap();
        assert!(cache.set_nx("lock", "b", Duration::from_secs(30)).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_set_nx_single_winner() {
        use std::sync::Arc;

        let cache = Arc::new(InMemoryCache::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .set_nx("lock", &i.to_string(), Duration::from_secs(30))
                    .await
                    .unwrap()
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
