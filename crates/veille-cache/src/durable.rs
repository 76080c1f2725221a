//! Durable tier adapter
//!
//! The authoritative store is abstracted behind `DurableStore` so the cache
//! crate never depends on the database crate; concrete stores over the
//! Postgres entity tables are wired in at composition time. Durable entries
//! survive restarts, are keyed by natural entity id, and are only superseded
//! by upserts, never expired in place.

use crate::key::CacheKey;
use crate::tier::{Tier, TierGet};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::warn;

/// Errors bubbling out of a concrete store (sqlx, serde, ...)
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Authoritative persistence for one resource type, keyed by the canonical
/// cache key (the natural id lives inside it).
#[async_trait]
pub trait DurableStore<T>: Send + Sync {
    /// Load a record and its last refresh timestamp
    async fn load(&self, key: &CacheKey) -> Result<Option<(T, DateTime<Utc>)>, StoreError>;

    /// Upsert, overwriting all fields and bumping the refresh timestamp
    async fn store(&self, key: &CacheKey, value: &T) -> Result<(), StoreError>;

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError>;
}

/// Durable tier over an injected store.
///
/// Read errors degrade to `Unavailable`; write errors are logged and dropped
/// so a failed write-through never fails the surrounding lookup.
pub struct DurableTier<T> {
    store: Arc<dyn DurableStore<T>>,
}

impl<T> DurableTier<T> {
    pub fn new(store: Arc<dyn DurableStore<T>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<T> Tier<T> for DurableTier<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "durable"
    }

    async fn get(&self, key: &CacheKey) -> TierGet<T> {
        match self.store.load(key).await {
            Ok(Some((value, written_at))) => TierGet::Hit {
                value,
                written_at,
                pre_validated: false,
            },
            Ok(None) => TierGet::Miss,
            Err(err) => {
                warn!(key = %key, error = %err, "Durable load failed");
                TierGet::Unavailable
            }
        }
    }

    async fn set(&self, key: &CacheKey, value: &T, _ttl: Option<Duration>) {
        if let Err(err) = self.store.store(key, value).await {
            warn!(key = %key, error = %err, "Durable write-through failed");
        }
    }

    async fn backfill(
        &self,
        _key: &CacheKey,
        _value: &T,
        _ttl: Option<Duration>,
        _written_at: DateTime<Utc>,
    ) {
        // The store's refresh timestamp bumps only on a provider fetch; an
        // upsert here would falsify it. Deeper-hit copies stay out of the
        // durable store.
    }

    async fn delete(&self, key: &CacheKey) {
        if let Err(err) = self.store.remove(key).await {
            warn!(key = %key, error = %err, "Durable delete failed");
        }
    }
}
