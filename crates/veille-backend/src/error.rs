//! Backend-level error type

use chrono::{DateTime, Utc};
use std::fmt;
use veille_cache::LookupError;

#[derive(Debug)]
pub enum BackendError {
    /// Database query or connection failure
    Database(sqlx::Error),
    /// Schema migration failure at startup
    Migrate(sqlx::migrate::MigrateError),
    /// Lookup failed at the provider after a full cache miss
    Lookup(LookupError),
    /// The user has exhausted the monthly generation quota
    QuotaExceeded {
        used: i32,
        limit: i32,
        reset_date: DateTime<Utc>,
    },
    /// Missing or malformed environment configuration
    Config(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::Migrate(e) => write!(f, "Migration error: {}", e),
            Self::Lookup(e) => write!(f, "Lookup error: {}", e),
            Self::QuotaExceeded {
                used,
                limit,
                reset_date,
            } => write!(
                f,
                "Quota exceeded: {}/{} used, resets {}",
                used, limit, reset_date
            ),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::Migrate(e) => Some(e),
            Self::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

impl From<sqlx::migrate::MigrateError> for BackendError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Migrate(e)
    }
}

impl From<LookupError> for BackendError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
