//! Authoritative company store, keyed by SIRET

use crate::types::{EntrepriseRow, UpsertEntrepriseParams};
use sqlx::PgPool;
use tracing::debug;

/// Insert or refresh a company record.
///
/// `created_at` is preserved across refreshes; `updated_at` is the freshness
/// timestamp the cache layer reads back.
pub async fn upsert(pool: &PgPool, params: &UpsertEntrepriseParams) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO entreprises (
            siret, siren, nom_entreprise, denomination_sociale, forme_juridique,
            adresse, code_naf, libelle_naf, effectif, date_creation,
            capital, numero_rcs, greffe, raw_data
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (siret) DO UPDATE SET
            siren = EXCLUDED.siren,
            nom_entreprise = EXCLUDED.nom_entreprise,
            denomination_sociale = EXCLUDED.denomination_sociale,
            forme_juridique = EXCLUDED.forme_juridique,
            adresse = EXCLUDED.adresse,
            code_naf = EXCLUDED.code_naf,
            libelle_naf = EXCLUDED.libelle_naf,
            effectif = EXCLUDED.effectif,
            date_creation = EXCLUDED.date_creation,
            capital = EXCLUDED.capital,
            numero_rcs = EXCLUDED.numero_rcs,
            greffe = EXCLUDED.greffe,
            raw_data = EXCLUDED.raw_data,
            updated_at = NOW()
        "#,
    )
    .bind(&params.siret)
    .bind(&params.siren)
    .bind(&params.nom_entreprise)
    .bind(&params.denomination_sociale)
    .bind(&params.forme_juridique)
    .bind(&params.adresse)
    .bind(&params.code_naf)
    .bind(&params.libelle_naf)
    .bind(&params.effectif)
    .bind(&params.date_creation)
    .bind(params.capital)
    .bind(&params.numero_rcs)
    .bind(&params.greffe)
    .bind(&params.raw_data)
    .execute(pool)
    .await?;

    debug!(siret = %params.siret, "Upserted entreprise");
    Ok(())
}

pub async fn find_by_siret(pool: &PgPool, siret: &str) -> sqlx::Result<Option<EntrepriseRow>> {
    sqlx::query_as::<_, EntrepriseRow>("SELECT * FROM entreprises WHERE siret = $1")
        .bind(siret)
        .fetch_optional(pool)
        .await
}

/// Most recently refreshed establishment for a SIREN, if any
pub async fn find_by_siren(pool: &PgPool, siren: &str) -> sqlx::Result<Option<EntrepriseRow>> {
    sqlx::query_as::<_, EntrepriseRow>(
        "SELECT * FROM entreprises WHERE siren = $1 ORDER BY updated_at DESC LIMIT 1",
    )
    .bind(siren)
    .fetch_optional(pool)
    .await
}

/// Case-insensitive substring match on the company name
pub async fn search_by_name(pool: &PgPool, name: &str) -> sqlx::Result<Vec<EntrepriseRow>> {
    sqlx::query_as::<_, EntrepriseRow>(
        r#"
        SELECT * FROM entreprises
        WHERE nom_entreprise ILIKE '%' || $1 || '%'
        ORDER BY updated_at DESC
        LIMIT 20
        "#,
    )
    .bind(name)
    .fetch_all(pool)
    .await
}

pub async fn delete(pool: &PgPool, siret: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM entreprises WHERE siret = $1")
        .bind(siret)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM entreprises")
        .fetch_one(pool)
        .await
}
