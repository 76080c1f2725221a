//! Uniform storage tier contract
//!
//! Each tier answers `get` with a hit, a miss, or "unavailable"; the chain
//! treats the last two identically except for logging. Writes are best-effort:
//! a tier that cannot persist logs the failure and stays silent, so a
//! write-through never fails an otherwise successful lookup.

use crate::key::CacheKey;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Result of a tier read
#[derive(Debug, Clone)]
pub enum TierGet<T> {
    /// The tier holds a value for this key
    Hit {
        value: T,
        /// When the value was last refreshed from the provider
        written_at: DateTime<Utc>,
        /// True when the tier's own expiry already encodes the freshness
        /// policy (distributed tier), so the chain skips the age check
        pre_validated: bool,
    },
    /// No entry for this key
    Miss,
    /// The tier could not be reached; skip silently
    Unavailable,
}

/// One layer of the cache hierarchy
#[async_trait]
pub trait Tier<T>: Send + Sync {
    /// Tier name for logs
    fn name(&self) -> &'static str;

    async fn get(&self, key: &CacheKey) -> TierGet<T>;

    /// Store a provider-grade value. `ttl` is honored where the tier supports
    /// native expiry; failures are logged inside the tier.
    async fn set(&self, key: &CacheKey, value: &T, ttl: Option<Duration>);

    /// Copy a hit from a deeper tier. The copy keeps the source entry's
    /// `written_at`: a cache-to-cache copy must not look like a provider
    /// refresh, or a stale entry could masquerade as fresh under a stricter
    /// usage.
    async fn backfill(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
        written_at: DateTime<Utc>,
    );

    async fn delete(&self, key: &CacheKey);
}
