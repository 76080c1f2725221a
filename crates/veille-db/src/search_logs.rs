//! Append-only lookup log backing the hit-rate statistics

use crate::types::SearchTotals;
use sqlx::PgPool;

pub async fn append(
    pool: &PgPool,
    query: &str,
    query_type: &str,
    source: &str,
    result_count: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO search_logs (query, query_type, source, result_count)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(query)
    .bind(query_type)
    .bind(source)
    .bind(result_count as i32)
    .execute(pool)
    .await?;
    Ok(())
}

/// Lookup totals over the last `days` days
pub async fn totals(pool: &PgPool, days: i32) -> sqlx::Result<SearchTotals> {
    sqlx::query_as::<_, SearchTotals>(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE source = 'cache') AS cache_hits
        FROM search_logs
        WHERE created_at >= NOW() - make_interval(days => $1)
        "#,
    )
    .bind(days)
    .fetch_one(pool)
    .await
}
