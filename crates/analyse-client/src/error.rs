//! Error types for the analysis service client

use std::fmt;

/// Errors that can occur when calling the analysis service
#[derive(Debug)]
pub enum AnalyseError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// The notice or document does not exist upstream
    NotFound,
    /// The service's rate limit is exhausted
    RateLimited,
    /// The service answered with an unexpected status
    Api(u16, String),
}

impl fmt::Display for AnalyseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Analyse HTTP error: {}", e),
            Self::NotFound => write!(f, "Notice not found"),
            Self::RateLimited => write!(f, "Analyse rate limit reached"),
            Self::Api(status, msg) => write!(f, "Analyse API error {}: {}", status, msg),
        }
    }
}

impl std::error::Error for AnalyseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AnalyseError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for analysis service operations
pub type Result<T> = std::result::Result<T, AnalyseError>;
