//! Error types for the Pappers API client

use std::fmt;

/// Errors that can occur when interacting with the Pappers API
#[derive(Debug)]
pub enum PappersError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// No company matches the identifier
    NotFound,
    /// The API token's rate limit is exhausted
    RateLimited,
    /// The API answered with an unexpected status
    Api(u16, String),
}

impl fmt::Display for PappersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Pappers HTTP error: {}", e),
            Self::NotFound => write!(f, "Entreprise not found"),
            Self::RateLimited => write!(f, "Pappers rate limit reached"),
            Self::Api(status, msg) => write!(f, "Pappers API error {}: {}", status, msg),
        }
    }
}

impl std::error::Error for PappersError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PappersError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for Pappers API operations
pub type Result<T> = std::result::Result<T, PappersError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(format!("{}", PappersError::NotFound), "Entreprise not found");
    }

    #[test]
    fn test_api_error_display() {
        let err = PappersError::Api(500, "internal".to_string());
        assert_eq!(format!("{}", err), "Pappers API error 500: internal");
    }
}
