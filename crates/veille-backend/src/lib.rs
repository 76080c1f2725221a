//! Service composition for the Veille tender backend.
//!
//! Wires the tiered cache, the Pappers and analysis clients, and the
//! Postgres layer into the services the application embeds: company lookups,
//! document and market analysis, generation quotas, and the operator cache
//! surface.

pub mod admin;
pub mod config;
pub mod error;
pub mod providers;
pub mod quota;
pub mod services;
pub mod state;
pub mod stores;
pub mod telemetry;

pub use admin::{CacheAdmin, CacheStats};
pub use config::Config;
pub use error::{BackendError, Result};
pub use quota::{QuotaService, QuotaStatus};
pub use services::{DocumentService, EntrepriseService, MarcheService};
pub use state::VeilleBackend;
