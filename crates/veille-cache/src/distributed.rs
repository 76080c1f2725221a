//! Shared distributed tier (Redis)
//!
//! Entries are JSON strings with native TTL expiry, so a hit here is fresh by
//! construction: the policy max age was applied at write time. The tier may
//! be absent or unreachable; every operation degrades after bounded retries
//! instead of failing the surrounding request.

use crate::key::CacheKey;
use crate::tier::{Tier, TierGet};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_RETRY_DELAY: StdDuration = StdDuration::from_millis(200);
const MAX_RETRY_DELAY: StdDuration = StdDuration::from_secs(2);

/// Envelope stored as the JSON value of every key
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    value: T,
    written_at: DateTime<Utc>,
}

/// Shared Redis handle. Cheap to clone; all typed tiers and the admin surface
/// share one connection manager.
#[derive(Clone)]
pub struct DistributedCache {
    conn: Option<ConnectionManager>,
}

impl DistributedCache {
    /// Connect to Redis. A failed connection disables the tier rather than
    /// failing startup.
    pub async fn connect(url: &str) -> Self {
        let client = match redis::Client::open(url) {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "Invalid Redis URL, distributed tier disabled");
                return Self { conn: None };
            }
        };
        match ConnectionManager::new(client).await {
            Ok(conn) => {
                info!("Redis connected");
                Self { conn: Some(conn) }
            }
            Err(err) => {
                warn!(error = %err, "Redis unreachable, distributed tier disabled");
                Self { conn: None }
            }
        }
    }

    /// A handle with no backing connection; every read is unavailable and
    /// every write is a no-op.
    pub fn disabled() -> Self {
        Self { conn: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    fn backoff_delay(attempt: u32) -> StdDuration {
        (INITIAL_RETRY_DELAY * 2u32.pow(attempt)).min(MAX_RETRY_DELAY)
    }

    async fn retry_delay(attempt: u32) {
        tokio::time::sleep(Self::backoff_delay(attempt)).await;
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let conn = self.conn.as_ref().ok_or_else(disabled_error)?;
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            let mut conn = conn.clone();
            match conn.get::<_, Option<String>>(key).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        Self::retry_delay(attempt).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(disabled_error))
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), redis::RedisError> {
        let conn = self.conn.as_ref().ok_or_else(disabled_error)?;
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            let mut conn = conn.clone();
            let result = match ttl_seconds {
                Some(secs) => conn.set_ex::<_, _, ()>(key, value, secs).await,
                None => conn.set::<_, _, ()>(key, value).await,
            };
            match result {
                Ok(()) => return Ok(()),
                Err(err) => {
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        Self::retry_delay(attempt).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(disabled_error))
    }

    async fn del_raw(&self, key: &str) -> Result<(), redis::RedisError> {
        let conn = self.conn.as_ref().ok_or_else(disabled_error)?;
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            let mut conn = conn.clone();
            match conn.del::<_, ()>(key).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        Self::retry_delay(attempt).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(disabled_error))
    }

    /// All keys matching a glob-style pattern. Empty on unavailability.
    pub async fn keys_matching(&self, pattern: &str) -> Vec<String> {
        let conn = match self.conn.as_ref() {
            Some(conn) => conn,
            None => return Vec::new(),
        };
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            let mut conn = conn.clone();
            match conn.keys::<_, Vec<String>>(pattern).await {
                Ok(keys) => return keys,
                Err(err) => {
                    last_err = Some(err);
                    if attempt + 1 < MAX_ATTEMPTS {
                        Self::retry_delay(attempt).await;
                    }
                }
            }
        }
        if let Some(err) = last_err {
            warn!(pattern = pattern, error = %err, "Redis KEYS failed");
        }
        Vec::new()
    }

    /// Delete every key matching a glob-style pattern, returning the number
    /// of keys removed.
    pub async fn delete_matching(&self, pattern: &str) -> usize {
        let keys = self.keys_matching(pattern).await;
        let mut removed = 0;
        for key in &keys {
            match self.del_raw(key).await {
                Ok(()) => removed += 1,
                Err(err) => warn!(key = key.as_str(), error = %err, "Redis DEL failed"),
            }
        }
        removed
    }

    /// Connectivity flag and live key count, degrading to (false, 0)
    pub async fn stats(&self) -> (bool, u64) {
        let conn = match self.conn.as_ref() {
            Some(conn) => conn,
            None => return (false, 0),
        };
        let mut conn = conn.clone();
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        if pong.is_err() {
            return (false, 0);
        }
        let keys: Result<u64, _> = redis::cmd("DBSIZE").query_async(&mut conn).await;
        (true, keys.unwrap_or(0))
    }
}

/// Typed view of the shared Redis handle implementing the tier contract
pub struct DistributedTier<T> {
    cache: DistributedCache,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DistributedTier<T> {
    pub fn new(cache: DistributedCache) -> Self {
        Self {
            cache,
            _marker: PhantomData,
        }
    }
}

impl<T> DistributedTier<T>
where
    T: Serialize + Clone,
{
    async fn write(
        &self,
        key: &CacheKey,
        value: &T,
        ttl_seconds: Option<u64>,
        written_at: DateTime<Utc>,
    ) {
        let envelope = Envelope {
            value: value.clone(),
            written_at,
        };
        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %key, error = %err, "Redis payload serialization failed");
                return;
            }
        };
        if let Err(err) = self.cache.set_raw(key.as_str(), &raw, ttl_seconds).await {
            debug!(key = %key, error = %err, "Redis set degraded");
        }
    }
}

#[async_trait]
impl<T> Tier<T> for DistributedTier<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &CacheKey) -> TierGet<T> {
        let raw = match self.cache.get_raw(key.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return TierGet::Miss,
            Err(err) => {
                debug!(key = %key, error = %err, "Redis get degraded");
                return TierGet::Unavailable;
            }
        };
        decode_hit(key, &raw)
    }

    async fn set(&self, key: &CacheKey, value: &T, ttl: Option<Duration>) {
        let ttl_seconds = ttl.and_then(|d| u64::try_from(d.num_seconds()).ok());
        self.write(key, value, ttl_seconds, Utc::now()).await;
    }

    async fn backfill(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
        written_at: DateTime<Utc>,
    ) {
        // The native expiry covers the remaining validity only; a copy must
        // die when the original would have.
        let ttl_seconds = match ttl {
            Some(d) => {
                let remaining = written_at + d - Utc::now();
                match u64::try_from(remaining.num_seconds()) {
                    Ok(secs) if secs > 0 => Some(secs),
                    _ => return,
                }
            }
            None => None,
        };
        self.write(key, value, ttl_seconds, written_at).await;
    }

    async fn delete(&self, key: &CacheKey) {
        if let Err(err) = self.cache.del_raw(key.as_str()).await {
            debug!(key = %key, error = %err, "Redis delete degraded");
        }
    }
}

/// Decode a stored envelope. An undecodable or legacy-shaped payload is a
/// miss for this tier only, never an error.
fn decode_hit<T: DeserializeOwned>(key: &CacheKey, raw: &str) -> TierGet<T> {
    match serde_json::from_str::<Envelope<T>>(raw) {
        Ok(envelope) => TierGet::Hit {
            value: envelope.value,
            written_at: envelope.written_at,
            pre_validated: true,
        },
        Err(err) => {
            warn!(key = %key, error = %err, "Redis payload undecodable, treating as miss");
            TierGet::Miss
        }
    }
}

fn disabled_error() -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::IoError,
        "distributed tier disabled",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceType;

    #[tokio::test]
    async fn test_disabled_cache_degrades() {
        let cache = DistributedCache::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.keys_matching("analyse:*").await, Vec::<String>::new());
        assert_eq!(cache.delete_matching("analyse:*").await, 0);
        assert_eq!(cache.stats().await, (false, 0));
    }

    #[tokio::test]
    async fn test_disabled_tier_is_unavailable_not_an_error() {
        let tier: DistributedTier<String> = DistributedTier::new(DistributedCache::disabled());
        let key = CacheKey::derive(ResourceType::MarcheAnalysis, "24-1");
        assert!(matches!(tier.get(&key).await, TierGet::Unavailable));
        // Writes are silent no-ops
        tier.set(&key, &"v".to_string(), Some(Duration::days(30))).await;
        tier.delete(&key).await;
    }

    #[test]
    fn test_corrupt_payload_is_a_miss_not_an_error() {
        let key = CacheKey::derive(ResourceType::Entreprise, "73282932000074");

        let got: TierGet<String> = decode_hit(&key, "{not json");
        assert!(matches!(got, TierGet::Miss));

        // A bare value without the envelope (legacy writer) degrades the same
        let got: TierGet<String> = decode_hit(&key, r#""just a string""#);
        assert!(matches!(got, TierGet::Miss));

        // Wrong value type inside an otherwise valid envelope
        let got: TierGet<String> =
            decode_hit(&key, r#"{"value":42,"written_at":"2026-01-01T00:00:00Z"}"#);
        assert!(matches!(got, TierGet::Miss));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(
            DistributedCache::backoff_delay(0),
            StdDuration::from_millis(200)
        );
        assert_eq!(
            DistributedCache::backoff_delay(1),
            StdDuration::from_millis(400)
        );
        assert_eq!(
            DistributedCache::backoff_delay(2),
            StdDuration::from_millis(800)
        );
        // Capped from the fourth attempt onward
        assert_eq!(DistributedCache::backoff_delay(4), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_envelope_round_trip() {
        let envelope = Envelope {
            value: "payload".to_string(),
            written_at: Utc::now(),
        };
        let raw = serde_json::to_string(&envelope).unwrap();
        let back: Envelope<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.value, "payload");
    }
}
