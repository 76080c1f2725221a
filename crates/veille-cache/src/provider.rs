//! Provider abstraction
//!
//! The lookup chain depends only on this trait; concrete HTTP clients are
//! wired in at composition time, so the cache never depends on a client crate
//! and vice versa.

use async_trait::async_trait;
use std::fmt;

/// Typed upstream failures. No internal retry; if a provider retries, it does
/// so behind this interface.
#[derive(Debug)]
pub enum ProviderError {
    /// The provider answered definitively that the entity does not exist
    NotFound,
    /// The provider rejected the call due to rate limiting
    RateLimited,
    /// Network failure or upstream server error
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotFound => write!(f, "Not found upstream"),
            ProviderError::RateLimited => write!(f, "Upstream rate limit reached"),
            ProviderError::Unavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// External fetcher invoked on a full cache miss.
///
/// The identifier is the raw lookup identifier: a SIRET, a search query, a
/// market id, or the extracted text of a document (which the chain keys by
/// content hash).
#[async_trait]
pub trait Provider<T>: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<T, ProviderError>;
}
