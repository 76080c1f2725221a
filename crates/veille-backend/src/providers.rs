//! Provider adapters bridging the HTTP clients into the lookup chains

use analyse_client::{AnalyseClient, AnalyseError, AnalyseMarche, ExtractedDocumentData};
use async_trait::async_trait;
use pappers_client::{EntrepriseData, PappersClient, PappersError};
use std::sync::Arc;
use veille_cache::{Provider, ProviderError};

pub(crate) fn map_pappers_error(err: PappersError) -> ProviderError {
    match err {
        PappersError::NotFound => ProviderError::NotFound,
        PappersError::RateLimited => ProviderError::RateLimited,
        PappersError::Http(e) => ProviderError::Unavailable(e.to_string()),
        PappersError::Api(status, msg) => {
            ProviderError::Unavailable(format!("Pappers {}: {}", status, msg))
        }
    }
}

pub(crate) fn map_analyse_error(err: AnalyseError) -> ProviderError {
    match err {
        AnalyseError::NotFound => ProviderError::NotFound,
        AnalyseError::RateLimited => ProviderError::RateLimited,
        AnalyseError::Http(e) => ProviderError::Unavailable(e.to_string()),
        AnalyseError::Api(status, msg) => {
            ProviderError::Unavailable(format!("Analyse {}: {}", status, msg))
        }
    }
}

/// Company lookup by SIRET
pub struct SiretProvider {
    client: Arc<PappersClient>,
}

impl SiretProvider {
    pub fn new(client: Arc<PappersClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider<EntrepriseData> for SiretProvider {
    async fn fetch(&self, identifier: &str) -> Result<EntrepriseData, ProviderError> {
        self.client
            .lookup_by_siret(identifier)
            .await
            .map_err(map_pappers_error)
    }
}

/// Fuzzy company search by name. An empty result list is a success and is
/// cached like any other value.
pub struct NameSearchProvider {
    client: Arc<PappersClient>,
}

impl NameSearchProvider {
    pub fn new(client: Arc<PappersClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider<Vec<EntrepriseData>> for NameSearchProvider {
    async fn fetch(&self, identifier: &str) -> Result<Vec<EntrepriseData>, ProviderError> {
        self.client
            .search_by_name(identifier)
            .await
            .map_err(map_pappers_error)
    }
}

/// Document extraction. The chain identifier is the document text itself;
/// the cache key hashes it, the provider analyses it.
pub struct DocumentAnalysisProvider {
    client: Arc<AnalyseClient>,
}

impl DocumentAnalysisProvider {
    pub fn new(client: Arc<AnalyseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider<ExtractedDocumentData> for DocumentAnalysisProvider {
    async fn fetch(&self, identifier: &str) -> Result<ExtractedDocumentData, ProviderError> {
        self.client
            .analyse_document(identifier)
            .await
            .map_err(map_analyse_error)
    }
}

/// Market analysis by BOAMP notice id
pub struct MarcheAnalysisProvider {
    client: Arc<AnalyseClient>,
}

impl MarcheAnalysisProvider {
    pub fn new(client: Arc<AnalyseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider<AnalyseMarche> for MarcheAnalysisProvider {
    async fn fetch(&self, identifier: &str) -> Result<AnalyseMarche, ProviderError> {
        self.client
            .analyse_marche(identifier)
            .await
            .map_err(map_analyse_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pappers_error_mapping() {
        assert!(matches!(
            map_pappers_error(PappersError::NotFound),
            ProviderError::NotFound
        ));
        assert!(matches!(
            map_pappers_error(PappersError::RateLimited),
            ProviderError::RateLimited
        ));
        assert!(matches!(
            map_pappers_error(PappersError::Api(502, "bad gateway".to_string())),
            ProviderError::Unavailable(_)
        ));
    }

    #[test]
    fn test_analyse_error_mapping() {
        assert!(matches!(
            map_analyse_error(AnalyseError::NotFound),
            ProviderError::NotFound
        ));
        assert!(matches!(
            map_analyse_error(AnalyseError::Api(500, "oops".to_string())),
            ProviderError::Unavailable(_)
        ));
    }
}
