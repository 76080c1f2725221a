//! Application services over the lookup chains.
//!
//! Every external read goes through a chain; the services add the operations
//! a chain cannot express alone, like resolving a SIREN to its head-office
//! SIRET before entering the SIRET chain.

use crate::error::Result;
use crate::providers::map_pappers_error;
use analyse_client::{AnalyseMarche, ExtractedDocumentData};
use chrono::Utc;
use pappers_client::{EntrepriseData, PappersClient};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use veille_cache::{
    CacheKey, LookupChain, LookupOutcome, LookupError, Provenance, UsageContext,
};

/// Company lookups and name search
pub struct EntrepriseService {
    chain: Arc<LookupChain<EntrepriseData>>,
    search_chain: Arc<LookupChain<Vec<EntrepriseData>>>,
    pool: PgPool,
    client: Arc<PappersClient>,
}

impl EntrepriseService {
    pub fn new(
        chain: Arc<LookupChain<EntrepriseData>>,
        search_chain: Arc<LookupChain<Vec<EntrepriseData>>>,
        pool: PgPool,
        client: Arc<PappersClient>,
    ) -> Self {
        Self {
            chain,
            search_chain,
            pool,
            client,
        }
    }

    pub async fn lookup_by_siret(
        &self,
        siret: &str,
        usage: UsageContext,
        force_refresh: bool,
    ) -> Result<LookupOutcome<EntrepriseData>> {
        Ok(self.chain.lookup(siret, usage, force_refresh).await?)
    }

    /// Resolve a SIREN to its head-office establishment.
    ///
    /// A known SIREN maps to a SIRET through the durable store and rejoins
    /// the SIRET chain; an unknown one is resolved at the provider and the
    /// record is written through under its SIRET so both identifiers hit the
    /// same entry afterwards.
    pub async fn lookup_by_siren(
        &self,
        siren: &str,
        usage: UsageContext,
        force_refresh: bool,
    ) -> Result<LookupOutcome<EntrepriseData>> {
        let siren: String = siren.chars().filter(|c| !c.is_whitespace()).collect();

        if !force_refresh {
            if let Some(row) = veille_db::entreprises::find_by_siren(&self.pool, &siren).await? {
                debug!(siren = %siren, siret = %row.siret, "SIREN resolved from store");
                return Ok(self.chain.lookup(&row.siret, usage, false).await?);
            }
        }

        let value = self
            .client
            .lookup_by_siren(&siren)
            .await
            .map_err(|e| LookupError::from(map_pappers_error(e)))?;
        self.chain.insert(&value.siret, &value, usage).await;
        Ok(LookupOutcome {
            value,
            provenance: Provenance::Provider,
            fetched_at: Utc::now(),
        })
    }

    /// Fuzzy name search. When the registry is unreachable, companies already
    /// held in the durable store are matched by name as a degraded answer.
    pub async fn search_by_name(
        &self,
        query: &str,
        usage: UsageContext,
        force_refresh: bool,
    ) -> Result<LookupOutcome<Vec<EntrepriseData>>> {
        match self.search_chain.lookup(query, usage, force_refresh).await {
            Ok(outcome) => Ok(outcome),
            Err(err @ (LookupError::ProviderUnavailable(_) | LookupError::RateLimited)) => {
                let rows = veille_db::entreprises::search_by_name(&self.pool, query.trim()).await?;
                if rows.is_empty() {
                    return Err(err.into());
                }
                debug!(query = query, matches = rows.len(), "Degraded search over stored companies");
                let value = rows
                    .into_iter()
                    .filter_map(|row| serde_json::from_value(row.raw_data).ok())
                    .collect();
                Ok(LookupOutcome {
                    value,
                    provenance: Provenance::Cache,
                    fetched_at: Utc::now(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Content-addressed document analysis
pub struct DocumentService {
    chain: Arc<LookupChain<ExtractedDocumentData>>,
}

impl DocumentService {
    pub fn new(chain: Arc<LookupChain<ExtractedDocumentData>>) -> Self {
        Self { chain }
    }

    /// Analyse a tender document, reusing any prior analysis of byte-identical
    /// text. Usage is fixed: an analysis never goes stale by context, only by
    /// age.
    pub async fn analyse(
        &self,
        text: &str,
        force_refresh: bool,
    ) -> Result<LookupOutcome<ExtractedDocumentData>> {
        Ok(self
            .chain
            .lookup(text, UsageContext::Info, force_refresh)
            .await?)
    }

    /// The content hash a document would be cached under
    pub fn content_key(text: &str) -> CacheKey {
        CacheKey::for_document(text.as_bytes())
    }
}

/// Market notice analysis
pub struct MarcheService {
    chain: Arc<LookupChain<AnalyseMarche>>,
}

impl MarcheService {
    pub fn new(chain: Arc<LookupChain<AnalyseMarche>>) -> Self {
        Self { chain }
    }

    pub async fn analyse(
        &self,
        marche_id: &str,
        usage: UsageContext,
        force_refresh: bool,
    ) -> Result<LookupOutcome<AnalyseMarche>> {
        Ok(self.chain.lookup(marche_id, usage, force_refresh).await?)
    }
}
