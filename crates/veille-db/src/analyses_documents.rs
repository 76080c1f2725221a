//! Content-addressed document analyses.
//!
//! The key is the SHA-256 of the document text, so an analysis is computed at
//! most once per distinct document regardless of who uploads it.

use crate::types::AnalyseDocumentRow;
use sqlx::PgPool;

pub async fn upsert(
    pool: &PgPool,
    content_hash: &str,
    analysis_result: &serde_json::Value,
    confidence: Option<i32>,
    warnings: Option<&serde_json::Value>,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analyses_documents (content_hash, analysis_result, confidence, warnings)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (content_hash) DO UPDATE SET
            analysis_result = EXCLUDED.analysis_result,
            confidence = EXCLUDED.confidence,
            warnings = EXCLUDED.warnings,
            created_at = NOW()
        "#,
    )
    .bind(content_hash)
    .bind(analysis_result)
    .bind(confidence)
    .bind(warnings)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, content_hash: &str) -> sqlx::Result<Option<AnalyseDocumentRow>> {
    sqlx::query_as::<_, AnalyseDocumentRow>(
        "SELECT * FROM analyses_documents WHERE content_hash = $1",
    )
    .bind(content_hash)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, content_hash: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM analyses_documents WHERE content_hash = $1")
        .bind(content_hash)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
