use sqlx::PgPool;
use tracing::info;

/// Run embedded migrations, creating the schema if needed
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}
