//! Durable tier adapters over the Postgres entity tables.
//!
//! Each store maps one resource type onto its table: the full record lives in
//! a JSONB column and the row's refresh timestamp feeds the freshness check.

use analyse_client::{AnalyseMarche, ExtractedDocumentData};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pappers_client::EntrepriseData;
use sqlx::PgPool;
use tracing::warn;
use veille_cache::durable::StoreError;
use veille_cache::{CacheKey, DurableStore, SearchLog, SearchLogEntry};
use veille_db::types::UpsertEntrepriseParams;

/// Company store over `entreprises`, keyed by SIRET
pub struct EntrepriseStore {
    pool: PgPool,
}

impl EntrepriseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn entreprise_upsert_params(value: &EntrepriseData) -> UpsertEntrepriseParams {
    UpsertEntrepriseParams {
        siret: value.siret.clone(),
        siren: value.siren.clone(),
        nom_entreprise: value.nom_commercial.clone(),
        denomination_sociale: Some(value.denomination_sociale.clone()),
        forme_juridique: value.forme_juridique.clone(),
        adresse: Some(value.adresse_etablissement.clone()),
        code_naf: value.code_naf.clone(),
        libelle_naf: value.libelle_naf.clone(),
        effectif: value.effectif.clone(),
        date_creation: value.date_creation.clone(),
        capital: value.capital,
        numero_rcs: value.numero_rcs.clone(),
        greffe: value.greffe.clone(),
        raw_data: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
    }
}

#[async_trait]
impl DurableStore<EntrepriseData> for EntrepriseStore {
    async fn load(
        &self,
        key: &CacheKey,
    ) -> Result<Option<(EntrepriseData, DateTime<Utc>)>, StoreError> {
        let row = veille_db::entreprises::find_by_siret(&self.pool, key.id()).await?;
        match row {
            Some(row) => {
                let value: EntrepriseData = serde_json::from_value(row.raw_data)?;
                Ok(Some((value, row.updated_at)))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, _key: &CacheKey, value: &EntrepriseData) -> Result<(), StoreError> {
        let params = entreprise_upsert_params(value);
        veille_db::entreprises::upsert(&self.pool, &params).await?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError> {
        veille_db::entreprises::delete(&self.pool, key.id()).await?;
        Ok(())
    }
}

/// Name-search store over `recherches_cache`, keyed by normalized query
pub struct RechercheStore {
    pool: PgPool,
}

impl RechercheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DurableStore<Vec<EntrepriseData>> for RechercheStore {
    async fn load(
        &self,
        key: &CacheKey,
    ) -> Result<Option<(Vec<EntrepriseData>, DateTime<Utc>)>, StoreError> {
        let row = veille_db::recherches::find(&self.pool, key.id()).await?;
        match row {
            Some(row) => {
                let value: Vec<EntrepriseData> = serde_json::from_value(row.results)?;
                Ok(Some((value, row.fetched_at)))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, key: &CacheKey, value: &Vec<EntrepriseData>) -> Result<(), StoreError> {
        let results = serde_json::to_value(value)?;
        veille_db::recherches::upsert(&self.pool, key.id(), &results).await?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError> {
        veille_db::recherches::delete(&self.pool, key.id()).await?;
        Ok(())
    }
}

/// Document analysis store over `analyses_documents`, keyed by content hash
pub struct AnalyseDocumentStore {
    pool: PgPool,
}

impl AnalyseDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DurableStore<ExtractedDocumentData> for AnalyseDocumentStore {
    async fn load(
        &self,
        key: &CacheKey,
    ) -> Result<Option<(ExtractedDocumentData, DateTime<Utc>)>, StoreError> {
        let row = veille_db::analyses_documents::find(&self.pool, key.id()).await?;
        match row {
            Some(row) => {
                let value: ExtractedDocumentData = serde_json::from_value(row.analysis_result)?;
                Ok(Some((value, row.created_at)))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, key: &CacheKey, value: &ExtractedDocumentData) -> Result<(), StoreError> {
        let analysis_result = serde_json::to_value(value)?;
        let warnings = if value.warnings.is_empty() {
            None
        } else {
            Some(serde_json::to_value(&value.warnings)?)
        };
        veille_db::analyses_documents::upsert(
            &self.pool,
            key.id(),
            &analysis_result,
            Some(value.confidence),
            warnings.as_ref(),
        )
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError> {
        veille_db::analyses_documents::delete(&self.pool, key.id()).await?;
        Ok(())
    }
}

/// Market analysis store over `analyses_marches`, keyed by BOAMP notice id
pub struct AnalyseMarcheStore {
    pool: PgPool,
}

impl AnalyseMarcheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DurableStore<AnalyseMarche> for AnalyseMarcheStore {
    async fn load(
        &self,
        key: &CacheKey,
    ) -> Result<Option<(AnalyseMarche, DateTime<Utc>)>, StoreError> {
        let row = veille_db::analyses_marches::find(&self.pool, key.id()).await?;
        match row {
            Some(row) => {
                let value: AnalyseMarche = serde_json::from_value(row.analysis)?;
                Ok(Some((value, row.analyzed_at)))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, key: &CacheKey, value: &AnalyseMarche) -> Result<(), StoreError> {
        let analysis = serde_json::to_value(value)?;
        veille_db::analyses_marches::upsert(&self.pool, key.id(), &analysis).await?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), StoreError> {
        veille_db::analyses_marches::delete(&self.pool, key.id()).await?;
        Ok(())
    }
}

/// Search log over `search_logs`. Append failures are logged and dropped so
/// statistics can never fail a lookup.
pub struct PgSearchLog {
    pool: PgPool,
}

impl PgSearchLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchLog for PgSearchLog {
    async fn append(&self, entry: SearchLogEntry) {
        if let Err(err) = veille_db::search_logs::append(
            &self.pool,
            &entry.query,
            entry.query_type,
            entry.source.as_str(),
            entry.result_count,
        )
        .await
        {
            warn!(query = %entry.query, error = %err, "Search log append failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entreprise_params_round_trip_through_raw_data() {
        let data = EntrepriseData {
            siren: "732829320".to_string(),
            siret: "73282932000074".to_string(),
            nom_commercial: "ACME".to_string(),
            denomination_sociale: "ACME SARL".to_string(),
            adresse_etablissement: "24 Rue du Commerce, 75015 Paris".to_string(),
            forme_juridique: Some("SARL".to_string()),
            code_naf: None,
            libelle_naf: None,
            effectif: None,
            dirigeants: Vec::new(),
            date_creation: None,
            date_creation_formate: None,
            capital: Some(10_000.0),
            numero_rcs: None,
            greffe: None,
        };
        let params = entreprise_upsert_params(&data);
        assert_eq!(params.siret, data.siret);
        assert_eq!(params.siren, data.siren);

        let back: EntrepriseData = serde_json::from_value(params.raw_data).unwrap();
        assert_eq!(back.siret, data.siret);
        assert_eq!(back.nom_commercial, data.nom_commercial);
    }
}
