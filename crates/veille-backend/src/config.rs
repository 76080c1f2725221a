use crate::error::{BackendError, Result};
use std::env;

pub const DEFAULT_QUOTA_MONTHLY_LIMIT: i32 = 5;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent disables the distributed tier entirely
    pub redis_url: Option<String>,
    pub pappers_api_token: String,
    /// Override for tests; the client has a production default
    pub pappers_api_url: Option<String>,
    pub analyse_api_url: String,
    pub analyse_api_key: String,
    pub quota_monthly_limit: i32,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| BackendError::Config("DATABASE_URL is required".to_string()))?;

        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.is_empty());

        let pappers_api_token = env::var("PAPPERS_API_TOKEN")
            .map_err(|_| BackendError::Config("PAPPERS_API_TOKEN is required".to_string()))?;
        let pappers_api_url = env::var("PAPPERS_API_URL").ok().filter(|s| !s.is_empty());

        let analyse_api_url =
            env::var("ANALYSE_API_URL").unwrap_or_else(|_| "http://localhost:8090".to_string());
        let analyse_api_key = env::var("ANALYSE_API_KEY")
            .map_err(|_| BackendError::Config("ANALYSE_API_KEY is required".to_string()))?;

        let quota_monthly_limit = env::var("QUOTA_MONTHLY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_QUOTA_MONTHLY_LIMIT);

        Ok(Self {
            database_url,
            redis_url,
            pappers_api_token,
            pappers_api_url,
            analyse_api_url,
            analyse_api_key,
            quota_monthly_limit,
        })
    }
}
