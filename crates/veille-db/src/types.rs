use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Company row in the authoritative `entreprises` table.
///
/// `raw_data` holds the full provider payload; the typed columns exist for
/// fuzzy search and operator queries only, so a load rebuilds the record from
/// the JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntrepriseRow {
    pub siret: String,
    pub siren: String,
    pub nom_entreprise: String,
    pub denomination_sociale: Option<String>,
    pub forme_juridique: Option<String>,
    pub adresse: Option<String>,
    pub code_naf: Option<String>,
    pub libelle_naf: Option<String>,
    pub effectif: Option<String>,
    pub date_creation: Option<String>,
    pub capital: Option<f64>,
    pub numero_rcs: Option<String>,
    pub greffe: Option<String>,
    pub raw_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for upserting a company
#[derive(Debug, Clone)]
pub struct UpsertEntrepriseParams {
    pub siret: String,
    pub siren: String,
    pub nom_entreprise: String,
    pub denomination_sociale: Option<String>,
    pub forme_juridique: Option<String>,
    pub adresse: Option<String>,
    pub code_naf: Option<String>,
    pub libelle_naf: Option<String>,
    pub effectif: Option<String>,
    pub date_creation: Option<String>,
    pub capital: Option<f64>,
    pub numero_rcs: Option<String>,
    pub greffe: Option<String>,
    pub raw_data: serde_json::Value,
}

/// Cached name-search row
#[derive(Debug, Clone, FromRow)]
pub struct RechercheRow {
    pub search_query: String,
    pub results: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

/// Content-addressed document analysis row
#[derive(Debug, Clone, FromRow)]
pub struct AnalyseDocumentRow {
    pub content_hash: String,
    pub analysis_result: serde_json::Value,
    pub confidence: Option<i32>,
    pub warnings: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Market analysis row
#[derive(Debug, Clone, FromRow)]
pub struct AnalyseMarcheRow {
    pub marche_id: String,
    pub analysis: serde_json::Value,
    pub analyzed_at: DateTime<Utc>,
}

/// Per-user monthly quota row
#[derive(Debug, Clone, FromRow)]
pub struct UserQuotaRow {
    pub user_id: String,
    pub generations_used: i32,
    pub quota_reset_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter slice returned by the atomic quota operations
#[derive(Debug, Clone, FromRow)]
pub struct QuotaCounterRow {
    pub generations_used: i32,
    pub quota_reset_date: DateTime<Utc>,
}

/// Aggregates over the append-only search log
#[derive(Debug, Clone, FromRow)]
pub struct SearchTotals {
    pub total: i64,
    pub cache_hits: i64,
}

/// Generation history row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeneratedDocumentRow {
    pub id: String,
    pub user_id: String,
    pub marche_id: String,
    pub marche_titre: Option<String>,
    pub marche_acheteur: Option<String>,
    pub document_type: String,
    pub file_name: Option<String>,
    pub file_format: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Parameters for recording a generated document
#[derive(Debug, Clone)]
pub struct InsertGeneratedDocumentParams {
    pub user_id: String,
    pub marche_id: String,
    pub marche_titre: Option<String>,
    pub marche_acheteur: Option<String>,
    pub document_type: String,
    pub file_name: Option<String>,
    pub file_format: Option<String>,
}
