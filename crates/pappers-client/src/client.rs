//! Pappers API HTTP client

use crate::error::{PappersError, Result};
use crate::types::{EntrepriseData, PappersResponse, PappersSearchResponse};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.pappers.fr/v2";
const SEARCH_LIMIT: u32 = 10;

/// Client for the Pappers business registry API.
///
/// No internal retry: rate-limit and availability failures surface as typed
/// errors and the caller decides.
pub struct PappersClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl PappersClient {
    /// Create a new client with default settings (30 second timeout)
    pub fn new(api_token: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_token)
    }

    /// Create a new client against a custom API URL
    pub fn with_base_url(base_url: &str, api_token: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        }
    }

    /// Look up an establishment by its 14-digit SIRET
    pub async fn lookup_by_siret(&self, siret: &str) -> Result<EntrepriseData> {
        let url = format!(
            "{}/entreprise?siret={}&api_token={}",
            self.base_url,
            urlencoding::encode(siret),
            self.api_token
        );
        let response: PappersResponse = self.fetch(&url).await?;
        debug!(siret = siret, "Pappers lookup succeeded");
        Ok(response.into())
    }

    /// Look up a company by its 9-digit SIREN (resolves to the head office)
    pub async fn lookup_by_siren(&self, siren: &str) -> Result<EntrepriseData> {
        let url = format!(
            "{}/entreprise?siren={}&api_token={}",
            self.base_url,
            urlencoding::encode(siren),
            self.api_token
        );
        let response: PappersResponse = self.fetch(&url).await?;
        debug!(siren = siren, "Pappers lookup succeeded");
        Ok(response.into())
    }

    /// Fuzzy search companies by name
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<EntrepriseData>> {
        let url = format!(
            "{}/recherche?q={}&par_page={}&api_token={}",
            self.base_url,
            urlencoding::encode(query),
            SEARCH_LIMIT,
            self.api_token
        );
        let response: PappersSearchResponse = self.fetch(&url).await?;
        debug!(query = query, total = response.total, "Pappers search succeeded");
        Ok(response.resultats.into_iter().map(Into::into).collect())
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Err(PappersError::NotFound);
        }
        if status.as_u16() == 429 {
            return Err(PappersError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PappersError::Api(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}
