//! Per-user monthly generation quotas.
//!
//! The check-and-increment is a single statement so two concurrent requests
//! against the last remaining slot cannot both succeed. A denied attempt
//! matches no row and leaves the counter untouched.

use crate::types::{QuotaCounterRow, UserQuotaRow};
use sqlx::PgPool;

/// Atomically consume one generation slot if the user is under `limit`.
///
/// Returns the counter after the increment when the slot was granted, or
/// `None` when the user is at the limit for the current period. An expired
/// period is rolled over in the same statement: the counter restarts at 1 and
/// the reset date moves to the start of the next month.
pub async fn check_and_increment(
    pool: &PgPool,
    user_id: &str,
    limit: i32,
) -> sqlx::Result<Option<QuotaCounterRow>> {
    sqlx::query_as::<_, QuotaCounterRow>(
        r#"
        INSERT INTO user_quotas (user_id, generations_used, quota_reset_date)
        VALUES ($1, 1, date_trunc('month', NOW() + INTERVAL '1 month'))
        ON CONFLICT (user_id) DO UPDATE SET
            generations_used = CASE
                WHEN user_quotas.quota_reset_date <= NOW() THEN 1
                ELSE user_quotas.generations_used + 1
            END,
            quota_reset_date = CASE
                WHEN user_quotas.quota_reset_date <= NOW()
                    THEN date_trunc('month', NOW() + INTERVAL '1 month')
                ELSE user_quotas.quota_reset_date
            END,
            updated_at = NOW()
        WHERE user_quotas.quota_reset_date <= NOW()
           OR user_quotas.generations_used < $2
        RETURNING generations_used, quota_reset_date
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_optional(pool)
    .await
}

/// Read the current counter without consuming a slot.
///
/// Creates the row on first sight and rolls an expired period over to zero,
/// so the value returned always reflects the current period.
pub async fn peek(pool: &PgPool, user_id: &str) -> sqlx::Result<QuotaCounterRow> {
    sqlx::query_as::<_, QuotaCounterRow>(
        r#"
        INSERT INTO user_quotas (user_id, generations_used, quota_reset_date)
        VALUES ($1, 0, date_trunc('month', NOW() + INTERVAL '1 month'))
        ON CONFLICT (user_id) DO UPDATE SET
            generations_used = CASE
                WHEN user_quotas.quota_reset_date <= NOW() THEN 0
                ELSE user_quotas.generations_used
            END,
            quota_reset_date = CASE
                WHEN user_quotas.quota_reset_date <= NOW()
                    THEN date_trunc('month', NOW() + INTERVAL '1 month')
                ELSE user_quotas.quota_reset_date
            END,
            updated_at = NOW()
        RETURNING generations_used, quota_reset_date
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn get(pool: &PgPool, user_id: &str) -> sqlx::Result<Option<UserQuotaRow>> {
    sqlx::query_as::<_, UserQuotaRow>("SELECT * FROM user_quotas WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
