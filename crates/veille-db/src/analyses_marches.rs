//! Stored market analyses, keyed by BOAMP notice id

use crate::types::AnalyseMarcheRow;
use sqlx::PgPool;

pub async fn upsert(pool: &PgPool, marche_id: &str, analysis: &serde_json::Value) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analyses_marches (marche_id, analysis, analyzed_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (marche_id) DO UPDATE SET
            analysis = EXCLUDED.analysis,
            analyzed_at = NOW()
        "#,
    )
    .bind(marche_id)
    .bind(analysis)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, marche_id: &str) -> sqlx::Result<Option<AnalyseMarcheRow>> {
    sqlx::query_as::<_, AnalyseMarcheRow>("SELECT * FROM analyses_marches WHERE marche_id = $1")
        .bind(marche_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, marche_id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM analyses_marches WHERE marche_id = $1")
        .bind(marche_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
