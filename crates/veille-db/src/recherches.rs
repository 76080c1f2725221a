//! Cached name-search results, keyed by normalized query

use crate::types::RechercheRow;
use sqlx::PgPool;

pub async fn upsert(pool: &PgPool, query: &str, results: &serde_json::Value) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recherches_cache (search_query, results, fetched_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (search_query) DO UPDATE SET
            results = EXCLUDED.results,
            fetched_at = NOW()
        "#,
    )
    .bind(query)
    .bind(results)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, query: &str) -> sqlx::Result<Option<RechercheRow>> {
    sqlx::query_as::<_, RechercheRow>("SELECT * FROM recherches_cache WHERE search_query = $1")
        .bind(query)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, query: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM recherches_cache WHERE search_query = $1")
        .bind(query)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
