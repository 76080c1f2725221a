//! Analysis service HTTP client

use crate::error::{AnalyseError, Result};
use crate::types::{AnalyseMarche, ExtractedDocumentData};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

// Analysis calls carry long documents and the model takes its time
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// Claude context limit: ~25k tokens of document text
const MAX_DOCUMENT_CHARS: usize = 100_000;
const TRUNCATION_MARK: &str = "\n\n[... document tronqué ...]";

#[derive(Serialize)]
struct DocumentRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct MarcheRequest<'a> {
    marche_id: &'a str,
}

/// Client for the document-extraction / market-analysis service
pub struct AnalyseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AnalyseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Extract DC1 pre-fill data from the text of a tender document.
    ///
    /// Text beyond the model's context limit is truncated with an explicit
    /// marker; the analysis still covers the head of the document where the
    /// acheteur and consultation blocks live.
    pub async fn analyse_document(&self, text: &str) -> Result<ExtractedDocumentData> {
        let truncated;
        let text = if text.len() > MAX_DOCUMENT_CHARS {
            let mut end = MAX_DOCUMENT_CHARS;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            truncated = format!("{}{}", &text[..end], TRUNCATION_MARK);
            debug!(original_len = text.len(), "Document truncated for analysis");
            truncated.as_str()
        } else {
            text
        };

        let url = format!("{}/v1/document/extraction", self.base_url);
        self.post(&url, &DocumentRequest { text }).await
    }

    /// Produce a structured analysis of a BOAMP market notice
    pub async fn analyse_marche(&self, marche_id: &str) -> Result<AnalyseMarche> {
        let url = format!("{}/v1/marche/analyse", self.base_url);
        self.post(&url, &MarcheRequest { marche_id }).await
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Err(AnalyseError::NotFound);
        }
        if status.as_u16() == 429 {
            return Err(AnalyseError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyseError::Api(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // Exercise the boundary walk with multi-byte content near the cut
        let text = "é".repeat(MAX_DOCUMENT_CHARS);
        let mut end = MAX_DOCUMENT_CHARS;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        assert!(text.is_char_boundary(end));
        assert!(end <= MAX_DOCUMENT_CHARS);
    }
}
