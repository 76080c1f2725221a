//! In-process memory tier
//!
//! Backed by a moka future cache: per-key synchronized, safe under concurrent
//! get/set from many in-flight requests without a global lock. Entries die
//! with the process and carry an explicit `expires_at` checked on read.

use crate::key::CacheKey;
use crate::tier::{Tier, TierGet};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use tracing::debug;

const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct MemoryEntry<T> {
    value: T,
    written_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

/// Process-local ephemeral cache tier
pub struct MemoryTier<T> {
    cache: Cache<String, MemoryEntry<T>>,
}

impl<T> MemoryTier<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Number of live entries (approximate, for stats)
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Insert with a backdated timestamp. Test hook for freshness scenarios.
    #[doc(hidden)]
    pub async fn insert_written_at(&self, key: &CacheKey, value: T, written_at: DateTime<Utc>) {
        self.cache
            .insert(
                key.as_str().to_string(),
                MemoryEntry {
                    value,
                    written_at,
                    expires_at: None,
                },
            )
            .await;
    }
}

impl<T> Default for MemoryTier<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Tier<T> for MemoryTier<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &CacheKey) -> TierGet<T> {
        match self.cache.get(key.as_str()).await {
            Some(entry) => {
                if let Some(expires_at) = entry.expires_at {
                    if Utc::now() >= expires_at {
                        self.cache.invalidate(key.as_str()).await;
                        return TierGet::Miss;
                    }
                }
                TierGet::Hit {
                    value: entry.value,
                    written_at: entry.written_at,
                    pre_validated: false,
                }
            }
            None => TierGet::Miss,
        }
    }

    async fn set(&self, key: &CacheKey, value: &T, ttl: Option<Duration>) {
        let now = Utc::now();
        let entry = MemoryEntry {
            value: value.clone(),
            written_at: now,
            expires_at: ttl.map(|d| now + d),
        };
        debug!(key = %key, "memory set");
        self.cache.insert(key.as_str().to_string(), entry).await;
    }

    async fn backfill(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
        written_at: DateTime<Utc>,
    ) {
        let entry = MemoryEntry {
            value: value.clone(),
            written_at,
            // Expiry runs from the original write, not from the copy
            expires_at: ttl.map(|d| written_at + d),
        };
        debug!(key = %key, "memory backfill");
        self.cache.insert(key.as_str().to_string(), entry).await;
    }

    async fn delete(&self, key: &CacheKey) {
        self.cache.invalidate(key.as_str()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceType;
    use std::sync::Arc;

    fn key(id: &str) -> CacheKey {
        CacheKey::derive(ResourceType::Entreprise, id)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let tier: MemoryTier<String> = MemoryTier::new();
        let k = key("73282932000074");
        tier.set(&k, &"value".to_string(), None).await;

        match tier.get(&k).await {
            TierGet::Hit { value, pre_validated, .. } => {
                assert_eq!(value, "value");
                assert!(!pre_validated);
            }
            other => panic!("expected hit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_absent_is_miss() {
        let tier: MemoryTier<String> = MemoryTier::new();
        assert!(matches!(tier.get(&key("00000000000000")).await, TierGet::Miss));
    }

    #[tokio::test]
    async fn test_delete() {
        let tier: MemoryTier<String> = MemoryTier::new();
        let k = key("73282932000074");
        tier.set(&k, &"value".to_string(), None).await;
        tier.delete(&k).await;
        assert!(matches!(tier.get(&k).await, TierGet::Miss));
    }

    #[tokio::test]
    async fn test_backfill_keeps_the_original_timestamp() {
        let tier: MemoryTier<String> = MemoryTier::new();
        let k = key("73282932000074");
        let written_at = Utc::now() - Duration::days(60);
        tier.backfill(&k, &"aged".to_string(), Some(Duration::days(180)), written_at)
            .await;

        match tier.get(&k).await {
            TierGet::Hit {
                written_at: got, ..
            } => assert_eq!(got, written_at),
            other => panic!("expected hit, got {:?}", other),
        }

        // A copy already older than its ttl is expired on arrival
        tier.backfill(&k, &"dead".to_string(), Some(Duration::days(30)), written_at)
            .await;
        assert!(matches!(tier.get(&k).await, TierGet::Miss));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let tier: MemoryTier<String> = MemoryTier::new();
        let k = key("73282932000074");
        tier.set(&k, &"value".to_string(), Some(Duration::seconds(-1))).await;
        assert!(matches!(tier.get(&k).await, TierGet::Miss));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_writes_do_not_lose_updates() {
        let tier: Arc<MemoryTier<u64>> = Arc::new(MemoryTier::new());

        let mut handles = Vec::new();
        for i in 0..64u64 {
            let tier = tier.clone();
            handles.push(tokio::spawn(async move {
                let k = key(&format!("{:014}", i));
                tier.set(&k, &i, None).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        for i in 0..64u64 {
            let k = key(&format!("{:014}", i));
            match tier.get(&k).await {
                TierGet::Hit { value, .. } => assert_eq!(value, i),
                other => panic!("lost update for {}: {:?}", i, other),
            }
        }
    }
}
