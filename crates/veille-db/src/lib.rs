//! Shared database layer for the Veille backend.
//!
//! One module per table. All functions take a `&PgPool` and return
//! `sqlx::Result`; connection management and transaction policy live with the
//! caller.

pub mod analyses_documents;
pub mod analyses_marches;
pub mod entreprises;
pub mod generated_documents;
pub mod migrate;
pub mod quotas;
pub mod recherches;
pub mod search_logs;
pub mod types;

pub use sqlx::PgPool;

use sqlx::postgres::PgPoolOptions;

/// Create a connection pool for the given database URL
pub async fn connect(database_url: &str) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}
