//! Monthly generation quota enforcement.
//!
//! Authorization and increment are one database statement, so the limit
//! holds under concurrent generation requests. Database failures deny the
//! generation; a quota that cannot be checked is treated as exhausted.

use crate::error::{BackendError, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use veille_db::types::{GeneratedDocumentRow, InsertGeneratedDocumentParams};

/// Quota counter as shown to the user
#[derive(Debug, Clone)]
pub struct QuotaStatus {
    pub used: i32,
    pub limit: i32,
    pub remaining: i32,
    pub reset_date: DateTime<Utc>,
}

impl QuotaStatus {
    fn new(used: i32, limit: i32, reset_date: DateTime<Utc>) -> Self {
        Self {
            used,
            limit,
            remaining: (limit - used).max(0),
            reset_date,
        }
    }
}

pub struct QuotaService {
    pool: PgPool,
    limit: i32,
}

impl QuotaService {
    pub fn new(pool: PgPool, limit: i32) -> Self {
        Self { pool, limit }
    }

    /// Consume one generation slot or fail with `QuotaExceeded`.
    ///
    /// On success the returned status reflects the counter after the
    /// increment. On denial the counter is untouched and the error carries
    /// the current period's numbers.
    pub async fn authorize(&self, user_id: &str) -> Result<QuotaStatus> {
        match veille_db::quotas::check_and_increment(&self.pool, user_id, self.limit).await? {
            Some(row) => {
                info!(
                    user_id = user_id,
                    used = row.generations_used,
                    limit = self.limit,
                    "Generation slot granted"
                );
                Ok(QuotaStatus::new(
                    row.generations_used,
                    self.limit,
                    row.quota_reset_date,
                ))
            }
            None => {
                let current = veille_db::quotas::peek(&self.pool, user_id).await?;
                info!(user_id = user_id, limit = self.limit, "Generation denied, quota exhausted");
                Err(BackendError::QuotaExceeded {
                    used: current.generations_used,
                    limit: self.limit,
                    reset_date: current.quota_reset_date,
                })
            }
        }
    }

    /// Current counter without consuming a slot
    pub async fn status(&self, user_id: &str) -> Result<QuotaStatus> {
        let row = veille_db::quotas::peek(&self.pool, user_id).await?;
        Ok(QuotaStatus::new(
            row.generations_used,
            self.limit,
            row.quota_reset_date,
        ))
    }

    /// Record a produced document in the generation history
    pub async fn record_generation(
        &self,
        params: &InsertGeneratedDocumentParams,
    ) -> Result<String> {
        let id = veille_db::generated_documents::insert(&self.pool, params).await?;
        Ok(id)
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<GeneratedDocumentRow>> {
        let rows = veille_db::generated_documents::list_for_user(&self.pool, user_id).await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_remaining_never_negative() {
        // A limit lowered below an already-consumed count must not underflow
        let status = QuotaStatus::new(7, 5, Utc::now());
        assert_eq!(status.remaining, 0);

        let status = QuotaStatus::new(2, 5, Utc::now());
        assert_eq!(status.remaining, 3);
    }
}
