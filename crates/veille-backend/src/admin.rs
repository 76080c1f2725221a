//! Operator surface: targeted invalidation and cache statistics

use crate::error::Result;
use analyse_client::{AnalyseMarche, ExtractedDocumentData};
use pappers_client::EntrepriseData;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use veille_cache::{CacheKey, DistributedCache, LookupChain, ResourceType};

/// Cache health and hit-rate snapshot
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub redis_connected: bool,
    pub redis_keys: u64,
    pub entreprises_stored: i64,
    pub lookups_total: i64,
    pub cache_hits: i64,
    pub hit_rate: f64,
}

/// Share of lookups answered from cache, 0.0 when nothing was looked up
pub(crate) fn hit_rate(total: i64, hits: i64) -> f64 {
    if total <= 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

pub struct CacheAdmin {
    redis: DistributedCache,
    pool: PgPool,
    entreprises: Arc<LookupChain<EntrepriseData>>,
    recherches: Arc<LookupChain<Vec<EntrepriseData>>>,
    documents: Arc<LookupChain<ExtractedDocumentData>>,
    marches: Arc<LookupChain<AnalyseMarche>>,
}

impl CacheAdmin {
    pub fn new(
        redis: DistributedCache,
        pool: PgPool,
        entreprises: Arc<LookupChain<EntrepriseData>>,
        recherches: Arc<LookupChain<Vec<EntrepriseData>>>,
        documents: Arc<LookupChain<ExtractedDocumentData>>,
        marches: Arc<LookupChain<AnalyseMarche>>,
    ) -> Self {
        Self {
            redis,
            pool,
            entreprises,
            recherches,
            documents,
            marches,
        }
    }

    /// Drop a company from every tier; the next lookup refetches
    pub async fn invalidate_entreprise(&self, siret: &str) {
        info!(siret = siret, "Invalidating entreprise");
        self.entreprises.invalidate(siret).await;
    }

    pub async fn invalidate_recherche(&self, query: &str) {
        self.recherches.invalidate(query).await;
    }

    /// Invalidate a document analysis by its content hash
    pub async fn invalidate_document(&self, content_hash: &str) {
        let key = CacheKey::for_document_hash(content_hash);
        self.documents.invalidate_key(&key).await;
    }

    pub async fn invalidate_marche(&self, marche_id: &str) {
        self.marches.invalidate(marche_id).await;
    }

    /// Delete distributed-tier keys matching a glob pattern, returning the
    /// number removed
    pub async fn invalidate_matching(&self, pattern: &str) -> usize {
        let removed = self.redis.delete_matching(pattern).await;
        info!(pattern = pattern, removed, "Invalidated matching distributed keys");
        removed
    }

    /// Purge one resource's namespace from the distributed tier, returning
    /// the number of keys removed. Memory entries age out through their TTL;
    /// the durable store is left untouched.
    pub async fn purge_distributed(&self, resource: ResourceType) -> usize {
        let pattern = format!("{}:*", resource.namespace());
        let removed = self.redis.delete_matching(&pattern).await;
        info!(namespace = resource.namespace(), removed, "Purged distributed namespace");
        removed
    }

    /// Snapshot over the last `days` days of the search log
    pub async fn stats(&self, days: i32) -> Result<CacheStats> {
        let (redis_connected, redis_keys) = self.redis.stats().await;
        let entreprises_stored = veille_db::entreprises::count(&self.pool).await?;
        let totals = veille_db::search_logs::totals(&self.pool, days).await?;
        Ok(CacheStats {
            redis_connected,
            redis_keys,
            entreprises_stored,
            lookups_total: totals.total,
            cache_hits: totals.cache_hits,
            hit_rate: hit_rate(totals.total, totals.cache_hits),
        })
    }
}
