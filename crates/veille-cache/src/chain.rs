//! Tiered lookup chain
//!
//! Checks tiers in order (memory, durable, distributed), falls through to the
//! provider on a full miss, and write-through-populates every tier on
//! success. A hit at a deeper tier is copied into the tiers above it with its
//! original timestamp; only a provider fetch resets the freshness clock. The chain is an explicit ordered list of tier strategies rather
//! than nested conditionals, so ordering is data and each tier is testable in
//! isolation.
//!
//! A stale-but-present entry blocks the caller for a synchronous refresh;
//! there is no stale-while-revalidate. Two concurrent lookups for the same
//! cold key each call the provider and each write through; that is tolerated
//! because write-throughs are idempotent overwrites of the same key.

use crate::error::{LookupError, Result};
use crate::freshness::{self, Freshness, UsageContext};
use crate::key::{CacheKey, ResourceType};
use crate::log::{SearchLog, SearchLogEntry};
use crate::provider::Provider;
use crate::tier::{Tier, TierGet};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Where a lookup result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cache,
    Provider,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Cache => "cache",
            Provenance::Provider => "provider",
        }
    }
}

/// A resolved lookup
#[derive(Debug, Clone)]
pub struct LookupOutcome<T> {
    pub value: T,
    pub provenance: Provenance,
    /// When the value was obtained from the provider (now for provider hits,
    /// the entry's refresh timestamp for cache hits)
    pub fetched_at: DateTime<Utc>,
}

/// Ordered tier fallback with provider fetch and write-through population
pub struct LookupChain<T> {
    resource: ResourceType,
    tiers: Vec<Arc<dyn Tier<T>>>,
    provider: Arc<dyn Provider<T>>,
    log: Arc<dyn SearchLog>,
    result_count: fn(&T) -> i64,
}

impl<T> LookupChain<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        resource: ResourceType,
        tiers: Vec<Arc<dyn Tier<T>>>,
        provider: Arc<dyn Provider<T>>,
        log: Arc<dyn SearchLog>,
    ) -> Self {
        Self {
            resource,
            tiers,
            provider,
            log,
            result_count: |_| 1,
        }
    }

    /// Override the logged result count (list-valued resources)
    pub fn with_result_count(mut self, result_count: fn(&T) -> i64) -> Self {
        self.result_count = result_count;
        self
    }

    /// Resolve a lookup through the tier chain.
    ///
    /// `force_refresh` skips every tier read and goes straight to the
    /// provider; the write-through still happens.
    pub async fn lookup(
        &self,
        identifier: &str,
        usage: UsageContext,
        force_refresh: bool,
    ) -> Result<LookupOutcome<T>> {
        let key = CacheKey::derive(self.resource, identifier);

        if !force_refresh {
            for (depth, tier) in self.tiers.iter().enumerate() {
                match tier.get(&key).await {
                    TierGet::Hit {
                        value,
                        written_at,
                        pre_validated,
                    } => {
                        let fresh = pre_validated
                            || freshness::classify(self.resource, usage, written_at, Utc::now())
                                == Freshness::Fresh;
                        if !fresh {
                            debug!(key = %key, tier = tier.name(), "Stale entry, continuing");
                            continue;
                        }
                        debug!(key = %key, tier = tier.name(), "Cache hit");
                        self.backfill(&self.tiers[..depth], &key, &value, usage, written_at)
                            .await;
                        self.append_log(identifier, Provenance::Cache, (self.result_count)(&value))
                            .await;
                        return Ok(LookupOutcome {
                            value,
                            provenance: Provenance::Cache,
                            fetched_at: written_at,
                        });
                    }
                    TierGet::Miss => {}
                    TierGet::Unavailable => {
                        debug!(key = %key, tier = tier.name(), "Tier unavailable, skipping");
                    }
                }
            }
        }

        info!(key = %key, "Cache miss, calling provider");
        match self.provider.fetch(identifier).await {
            Ok(value) => {
                self.populate(&self.tiers, &key, &value, usage).await;
                self.append_log(identifier, Provenance::Provider, (self.result_count)(&value))
                    .await;
                Ok(LookupOutcome {
                    value,
                    provenance: Provenance::Provider,
                    fetched_at: Utc::now(),
                })
            }
            Err(err) => {
                self.append_log(identifier, Provenance::Provider, 0).await;
                Err(LookupError::from(err))
            }
        }
    }

    /// Remove the entry for an identifier from every tier
    pub async fn invalidate(&self, identifier: &str) {
        let key = CacheKey::derive(self.resource, identifier);
        self.invalidate_key(&key).await;
    }

    /// Remove an already-derived key from every tier. Needed where the caller
    /// holds a content hash rather than the original document text.
    pub async fn invalidate_key(&self, key: &CacheKey) {
        for tier in &self.tiers {
            tier.delete(key).await;
        }
    }

    /// Write a provider-grade value through every tier without a lookup.
    /// Used by producers that already hold the record (e.g. a SIREN lookup
    /// that resolved the establishment through the provider).
    pub async fn insert(&self, identifier: &str, value: &T, usage: UsageContext) {
        let key = CacheKey::derive(self.resource, identifier);
        self.populate(&self.tiers, &key, value, usage).await;
    }

    async fn populate(&self, tiers: &[Arc<dyn Tier<T>>], key: &CacheKey, value: &T, usage: UsageContext) {
        let ttl = freshness::max_age(self.resource, usage);
        for tier in tiers {
            tier.set(key, value, Some(ttl)).await;
        }
    }

    // Copies keep the source entry's timestamp; only `populate` after a
    // provider fetch resets the freshness clock.
    async fn backfill(
        &self,
        tiers: &[Arc<dyn Tier<T>>],
        key: &CacheKey,
        value: &T,
        usage: UsageContext,
        written_at: DateTime<Utc>,
    ) {
        let ttl = freshness::max_age(self.resource, usage);
        for tier in tiers {
            tier.backfill(key, value, Some(ttl), written_at).await;
        }
    }

    async fn append_log(&self, identifier: &str, source: Provenance, result_count: i64) {
        self.log
            .append(SearchLogEntry {
                query: identifier.to_string(),
                query_type: self.resource.log_name(),
                source,
                result_count,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTier;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        value: Option<String>,
        calls: AtomicUsize,
        error: Option<fn() -> ProviderError>,
    }

    impl MockProvider {
        fn returning(value: &str) -> Arc<Self> {
            Arc::new(Self {
                value: Some(value.to_string()),
                calls: AtomicUsize::new(0),
                error: None,
            })
        }

        fn failing(error: fn() -> ProviderError) -> Arc<Self> {
            Arc::new(Self {
                value: None,
                calls: AtomicUsize::new(0),
                error: Some(error),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider<String> for MockProvider {
        async fn fetch(&self, _identifier: &str) -> std::result::Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(make) => Err(make()),
                None => Ok(self.value.clone().unwrap()),
            }
        }
    }

    struct RecordingLog {
        entries: Mutex<Vec<SearchLogEntry>>,
    }

    impl RecordingLog {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                entries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchLog for RecordingLog {
        async fn append(&self, entry: SearchLogEntry) {
            self.entries.lock().unwrap().push(entry);
        }
    }

    struct FlakyTier;

    #[async_trait]
    impl Tier<String> for FlakyTier {
        fn name(&self) -> &'static str {
            "flaky"
        }
        async fn get(&self, _key: &CacheKey) -> TierGet<String> {
            TierGet::Unavailable
        }
        async fn set(&self, _key: &CacheKey, _value: &String, _ttl: Option<Duration>) {}
        async fn backfill(
            &self,
            _key: &CacheKey,
            _value: &String,
            _ttl: Option<Duration>,
            _written_at: DateTime<Utc>,
        ) {
        }
        async fn delete(&self, _key: &CacheKey) {}
    }

    fn chain_with(
        resource: ResourceType,
        tiers: Vec<Arc<dyn Tier<String>>>,
        provider: Arc<MockProvider>,
    ) -> LookupChain<String> {
        LookupChain::new(resource, tiers, provider, Arc::new(crate::log::NoopSearchLog))
    }

    const SIRET: &str = "73282932000074";

    #[tokio::test]
    async fn test_cold_lookup_then_cached_repeat() {
        // Scenario A: empty cache, one provider call, then pure cache hits.
        let memory = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("record");
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone()],
            provider.clone(),
        );

        let first = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(first.provenance, Provenance::Provider);
        assert_eq!(first.value, "record");
        assert_eq!(provider.calls(), 1);

        let second = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(second.provenance, Provenance::Cache);
        assert_eq!(second.value, "record");
        assert_eq!(provider.calls(), 1);

        // Idempotence: further repeats stay on cache
        for _ in 0..5 {
            let again = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
            assert_eq!(again.provenance, Provenance::Cache);
            assert_eq!(again.value, "record");
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_usage_sensitivity_on_the_same_entry() {
        // An entry aged 2 months is fresh for Info (6 months) and stale for
        // Candidature (1 month).
        let memory = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("refetched");
        let key = CacheKey::derive(ResourceType::Entreprise, SIRET);
        memory
            .insert_written_at(&key, "aged".to_string(), Utc::now() - Duration::days(60))
            .await;

        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone()],
            provider.clone(),
        );

        let info = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(info.provenance, Provenance::Cache);
        assert_eq!(info.value, "aged");
        assert_eq!(provider.calls(), 0);

        let candidature = chain
            .lookup(SIRET, UsageContext::Candidature, false)
            .await
            .unwrap();
        assert_eq!(candidature.provenance, Provenance::Provider);
        assert_eq!(candidature.value, "refetched");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_forces_refetch_and_overwrite() {
        let memory = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("fresh");
        let key = CacheKey::derive(ResourceType::MarcheAnalysis, "24-77");
        memory
            .insert_written_at(&key, "old".to_string(), Utc::now() - Duration::days(45))
            .await;

        let chain = chain_with(
            ResourceType::MarcheAnalysis,
            vec![memory.clone()],
            provider.clone(),
        );

        let outcome = chain.lookup("24-77", UsageContext::Info, false).await.unwrap();
        assert_eq!(outcome.provenance, Provenance::Provider);
        assert_eq!(outcome.value, "fresh");

        // The stale entry was overwritten in place
        let again = chain.lookup("24-77", UsageContext::Info, false).await.unwrap();
        assert_eq!(again.provenance, Provenance::Cache);
        assert_eq!(again.value, "fresh");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_deeper_hit_backfills_earlier_tiers() {
        let memory = Arc::new(MemoryTier::new());
        let durable = Arc::new(MemoryTier::new());
        let key = CacheKey::derive(ResourceType::Entreprise, SIRET);
        durable
            .insert_written_at(&key, "stored".to_string(), Utc::now() - Duration::days(1))
            .await;

        let provider = MockProvider::returning("unused");
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone(), durable.clone()],
            provider.clone(),
        );

        let outcome = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(outcome.provenance, Provenance::Cache);
        assert_eq!(provider.calls(), 0);

        // The memory tier was populated by the hit one level down
        assert!(matches!(memory.get(&key).await, TierGet::Hit { .. }));
    }

    #[tokio::test]
    async fn test_backfill_preserves_entry_age_across_tiers() {
        // A 2-month-old record hit in a deeper tier is copied forward with
        // its original timestamp: still fresh for Info, still stale for
        // Candidature.
        let memory = Arc::new(MemoryTier::new());
        let durable = Arc::new(MemoryTier::new());
        let key = CacheKey::derive(ResourceType::Entreprise, SIRET);
        let aged_at = Utc::now() - Duration::days(60);
        durable
            .insert_written_at(&key, "aged".to_string(), aged_at)
            .await;

        let provider = MockProvider::returning("refetched");
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone(), durable.clone()],
            provider.clone(),
        );

        let info = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(info.provenance, Provenance::Cache);
        assert_eq!(provider.calls(), 0);

        // The copy in the memory tier kept the original timestamp
        match memory.get(&key).await {
            TierGet::Hit { written_at, .. } => assert_eq!(written_at, aged_at),
            other => panic!("expected backfilled hit, got {:?}", other),
        }

        // The stricter usage sees through the copy and refetches
        let candidature = chain
            .lookup(SIRET, UsageContext::Candidature, false)
            .await
            .unwrap();
        assert_eq!(candidature.provenance, Provenance::Provider);
        assert_eq!(candidature.value, "refetched");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_tier_degrades_to_next() {
        let memory = Arc::new(MemoryTier::new());
        let key = CacheKey::derive(ResourceType::Entreprise, SIRET);
        memory
            .insert_written_at(&key, "behind the outage".to_string(), Utc::now())
            .await;

        let provider = MockProvider::returning("unused");
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![Arc::new(FlakyTier), memory],
            provider.clone(),
        );

        let outcome = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(outcome.provenance, Provenance::Cache);
        assert_eq!(outcome.value, "behind the outage");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_force_refresh_skips_tiers() {
        let memory = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("forced");
        let key = CacheKey::derive(ResourceType::Entreprise, SIRET);
        memory.insert_written_at(&key, "cached".to_string(), Utc::now()).await;

        let chain = chain_with(ResourceType::Entreprise, vec![memory], provider.clone());

        let outcome = chain.lookup(SIRET, UsageContext::Info, true).await.unwrap();
        assert_eq!(outcome.provenance, Provenance::Provider);
        assert_eq!(outcome.value, "forced");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_and_caches_nothing() {
        let memory: Arc<MemoryTier<String>> = Arc::new(MemoryTier::new());
        let provider = MockProvider::failing(|| ProviderError::NotFound);
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone()],
            provider.clone(),
        );

        let err = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound));

        // Nothing cached: the next call hits the provider again
        let err = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_distinctly() {
        let provider = MockProvider::failing(|| ProviderError::RateLimited);
        let chain = chain_with(ResourceType::Entreprise, vec![], provider);
        let err = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap_err();
        assert!(matches!(err, LookupError::RateLimited));
    }

    #[tokio::test]
    async fn test_identical_document_bytes_reuse_the_analysis() {
        // Scenario B: two analysis requests for byte-identical content; the
        // second is served from cache with zero provider calls.
        let memory = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("structured result");
        let chain = chain_with(
            ResourceType::DocumentAnalysis,
            vec![memory],
            provider.clone(),
        );

        let text = "Reglement de consultation, marche 24-123";
        let first = chain.lookup(text, UsageContext::Info, false).await.unwrap();
        assert_eq!(first.provenance, Provenance::Provider);

        let second = chain.lookup(text, UsageContext::Info, false).await.unwrap();
        assert_eq!(second.provenance, Provenance::Cache);
        assert_eq!(second.value, "structured result");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_every_lookup_is_logged_with_source() {
        let log = RecordingLog::new();
        let provider = MockProvider::returning("record");
        let chain = LookupChain::new(
            ResourceType::Entreprise,
            vec![Arc::new(MemoryTier::new())],
            provider,
            log.clone(),
        );

        chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, Provenance::Provider);
        assert_eq!(entries[1].source, Provenance::Cache);
        assert_eq!(entries[0].query, SIRET);
        assert_eq!(entries[0].query_type, "siret");
        assert_eq!(entries[0].result_count, 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_logged_with_zero_results() {
        let log = RecordingLog::new();
        let provider = MockProvider::failing(|| ProviderError::Unavailable("down".into()));
        let chain: LookupChain<String> =
            LookupChain::new(ResourceType::Entreprise, vec![], provider, log.clone());

        let _ = chain.lookup(SIRET, UsageContext::Info, false).await;

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, Provenance::Provider);
        assert_eq!(entries[0].result_count, 0);
    }

    #[tokio::test]
    async fn test_invalidate_clears_every_tier() {
        let memory = Arc::new(MemoryTier::new());
        let durable = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("record");
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone(), durable.clone()],
            provider.clone(),
        );

        chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        chain.invalidate(SIRET).await;

        let key = CacheKey::derive(ResourceType::Entreprise, SIRET);
        assert!(matches!(memory.get(&key).await, TierGet::Miss));
        assert!(matches!(durable.get(&key).await, TierGet::Miss));
    }

    #[tokio::test]
    async fn test_insert_writes_through_without_provider() {
        let memory = Arc::new(MemoryTier::new());
        let provider = MockProvider::returning("unused");
        let chain = chain_with(
            ResourceType::Entreprise,
            vec![memory.clone()],
            provider.clone(),
        );

        chain.insert(SIRET, &"pushed".to_string(), UsageContext::Info).await;

        let outcome = chain.lookup(SIRET, UsageContext::Info, false).await.unwrap();
        assert_eq!(outcome.provenance, Provenance::Cache);
        assert_eq!(outcome.value, "pushed");
        assert_eq!(provider.calls(), 0);
    }
}
