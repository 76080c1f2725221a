//! Search event logging
//!
//! Every lookup appends one entry recording where the answer came from; the
//! stats surface later aggregates hit rate from these. Logging is best-effort
//! and must never fail a lookup, so the sink swallows its own errors.

use crate::chain::Provenance;
use async_trait::async_trait;

/// One logged lookup event, append-only
#[derive(Debug, Clone)]
pub struct SearchLogEntry {
    pub query: String,
    /// Resource short name (siret, nom, document, marche)
    pub query_type: &'static str,
    pub source: Provenance,
    pub result_count: i64,
}

/// Append-only sink for lookup events
#[async_trait]
pub trait SearchLog: Send + Sync {
    async fn append(&self, entry: SearchLogEntry);
}

/// Sink that drops every entry; used where no log table is wired in
pub struct NoopSearchLog;

#[async_trait]
impl SearchLog for NoopSearchLog {
    async fn append(&self, _entry: SearchLogEntry) {}
}
