//! Composition root: builds the tier chains and services from configuration

use crate::admin::CacheAdmin;
use crate::config::Config;
use crate::error::Result;
use crate::providers::{
    DocumentAnalysisProvider, MarcheAnalysisProvider, NameSearchProvider, SiretProvider,
};
use crate::quota::QuotaService;
use crate::services::{DocumentService, EntrepriseService, MarcheService};
use crate::stores::{
    AnalyseDocumentStore, AnalyseMarcheStore, EntrepriseStore, PgSearchLog, RechercheStore,
};
use analyse_client::{AnalyseClient, AnalyseMarche, ExtractedDocumentData};
use pappers_client::{EntrepriseData, PappersClient};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use veille_cache::{
    DistributedCache, DistributedTier, DurableTier, LookupChain, MemoryTier, ResourceType,
    SearchLog, Tier,
};

/// Fully wired backend. Tier order is fixed: memory, durable, distributed.
pub struct VeilleBackend {
    pub config: Config,
    pub pool: PgPool,
    pub redis: DistributedCache,
    pub entreprises: EntrepriseService,
    pub documents: DocumentService,
    pub marches: MarcheService,
    pub quotas: QuotaService,
    pub admin: CacheAdmin,
}

impl VeilleBackend {
    /// Connect to Postgres and Redis, run migrations, and wire every chain.
    /// Redis being down degrades the distributed tier; Postgres being down
    /// fails startup.
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = veille_db::connect(&config.database_url).await?;
        veille_db::migrate::run(&pool).await?;

        let redis = match &config.redis_url {
            Some(url) => DistributedCache::connect(url).await,
            None => {
                info!("REDIS_URL not set, distributed tier disabled");
                DistributedCache::disabled()
            }
        };

        let pappers = Arc::new(match &config.pappers_api_url {
            Some(url) => PappersClient::with_base_url(url, &config.pappers_api_token),
            None => PappersClient::new(&config.pappers_api_token),
        });
        let analyse = Arc::new(AnalyseClient::new(
            &config.analyse_api_url,
            &config.analyse_api_key,
        ));
        let log: Arc<dyn SearchLog> = Arc::new(PgSearchLog::new(pool.clone()));

        let entreprise_tiers: Vec<Arc<dyn Tier<EntrepriseData>>> = vec![
            Arc::new(MemoryTier::new()),
            Arc::new(DurableTier::new(Arc::new(EntrepriseStore::new(
                pool.clone(),
            )))),
            Arc::new(DistributedTier::new(redis.clone())),
        ];
        let entreprise_chain = Arc::new(LookupChain::new(
            ResourceType::Entreprise,
            entreprise_tiers,
            Arc::new(SiretProvider::new(pappers.clone())),
            log.clone(),
        ));

        let search_tiers: Vec<Arc<dyn Tier<Vec<EntrepriseData>>>> = vec![
            Arc::new(MemoryTier::new()),
            Arc::new(DurableTier::new(Arc::new(RechercheStore::new(
                pool.clone(),
            )))),
            Arc::new(DistributedTier::new(redis.clone())),
        ];
        let search_chain = Arc::new(
            LookupChain::new(
                ResourceType::EntrepriseSearch,
                search_tiers,
                Arc::new(NameSearchProvider::new(pappers.clone())),
                log.clone(),
            )
            .with_result_count(|results| results.len() as i64),
        );

        let document_tiers: Vec<Arc<dyn Tier<ExtractedDocumentData>>> = vec![
            Arc::new(MemoryTier::new()),
            Arc::new(DurableTier::new(Arc::new(AnalyseDocumentStore::new(
                pool.clone(),
            )))),
            Arc::new(DistributedTier::new(redis.clone())),
        ];
        let document_chain = Arc::new(LookupChain::new(
            ResourceType::DocumentAnalysis,
            document_tiers,
            Arc::new(DocumentAnalysisProvider::new(analyse.clone())),
            log.clone(),
        ));

        let marche_tiers: Vec<Arc<dyn Tier<AnalyseMarche>>> = vec![
            Arc::new(MemoryTier::new()),
            Arc::new(DurableTier::new(Arc::new(AnalyseMarcheStore::new(
                pool.clone(),
            )))),
            Arc::new(DistributedTier::new(redis.clone())),
        ];
        let marche_chain = Arc::new(LookupChain::new(
            ResourceType::MarcheAnalysis,
            marche_tiers,
            Arc::new(MarcheAnalysisProvider::new(analyse.clone())),
            log.clone(),
        ));

        let entreprises = EntrepriseService::new(
            entreprise_chain.clone(),
            search_chain.clone(),
            pool.clone(),
            pappers.clone(),
        );
        let documents = DocumentService::new(document_chain.clone());
        let marches = MarcheService::new(marche_chain.clone());
        let quotas = QuotaService::new(pool.clone(), config.quota_monthly_limit);
        let admin = CacheAdmin::new(
            redis.clone(),
            pool.clone(),
            entreprise_chain,
            search_chain,
            document_chain,
            marche_chain,
        );

        info!("Backend wired, all chains ready");
        Ok(Self {
            config,
            pool,
            redis,
            entreprises,
            documents,
            marches,
            quotas,
            admin,
        })
    }
}
