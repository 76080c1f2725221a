//! Generation history, one row per produced document

use crate::types::{GeneratedDocumentRow, InsertGeneratedDocumentParams};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, params: &InsertGeneratedDocumentParams) -> sqlx::Result<String> {
    sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO generated_documents (
            user_id, marche_id, marche_titre, marche_acheteur,
            document_type, file_name, file_format
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id::text
        "#,
    )
    .bind(&params.user_id)
    .bind(&params.marche_id)
    .bind(&params.marche_titre)
    .bind(&params.marche_acheteur)
    .bind(&params.document_type)
    .bind(&params.file_name)
    .bind(&params.file_format)
    .fetch_one(pool)
    .await
}

/// Most recent generations for a user, newest first
pub async fn list_for_user(pool: &PgPool, user_id: &str) -> sqlx::Result<Vec<GeneratedDocumentRow>> {
    sqlx::query_as::<_, GeneratedDocumentRow>(
        r#"
        SELECT id::text AS id, user_id, marche_id, marche_titre, marche_acheteur,
               document_type, file_name, file_format, generated_at
        FROM generated_documents
        WHERE user_id = $1
        ORDER BY generated_at DESC
        LIMIT 50
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
