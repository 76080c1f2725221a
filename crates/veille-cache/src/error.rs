//! Error types for the lookup chain

use crate::provider::ProviderError;
use std::fmt;

/// Errors surfaced to lookup callers.
///
/// Tier failures never appear here: a distributed-tier outage degrades to the
/// next tier and an undecodable payload is treated as a miss for that tier
/// only.
#[derive(Debug)]
pub enum LookupError {
    /// Absent in every tier and at the provider; never cached
    NotFound,
    /// The provider rejected the call due to rate limiting; never cached,
    /// never retried here
    RateLimited,
    /// The provider could not be reached or answered with a server error
    ProviderUnavailable(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "Not found"),
            LookupError::RateLimited => write!(f, "Provider rate limit reached"),
            LookupError::ProviderUnavailable(msg) => {
                write!(f, "Provider unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for LookupError {}

impl From<ProviderError> for LookupError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound => LookupError::NotFound,
            ProviderError::RateLimited => LookupError::RateLimited,
            ProviderError::Unavailable(msg) => LookupError::ProviderUnavailable(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(format!("{}", LookupError::NotFound), "Not found");
    }

    #[test]
    fn test_unavailable_display() {
        let err = LookupError::ProviderUnavailable("connection refused".to_string());
        assert_eq!(format!("{}", err), "Provider unavailable: connection refused");
    }

    #[test]
    fn test_from_provider_error() {
        assert!(matches!(
            LookupError::from(ProviderError::NotFound),
            LookupError::NotFound
        ));
        assert!(matches!(
            LookupError::from(ProviderError::RateLimited),
            LookupError::RateLimited
        ));
    }
}
