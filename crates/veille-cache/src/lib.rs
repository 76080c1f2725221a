//! Tiered caching for the Veille backend
//!
//! Mediates between the application and expensive, rate-limited upstream
//! providers (Pappers business registry, document/market analysis AI) through
//! three cache tiers: an in-process memory tier, the authoritative Postgres
//! store, and a shared Redis tier. Freshness is decided at read time from a
//! (resource, usage) policy table rather than a per-entry TTL.

pub mod chain;
pub mod distributed;
pub mod durable;
pub mod error;
pub mod freshness;
pub mod key;
pub mod log;
pub mod memory;
pub mod provider;
pub mod tier;

pub use chain::{LookupChain, LookupOutcome, Provenance};
pub use distributed::{DistributedCache, DistributedTier};
pub use durable::{DurableStore, DurableTier};
pub use error::{LookupError, Result};
pub use freshness::{Freshness, UsageContext};
pub use key::{CacheKey, ResourceType};
pub use log::{SearchLog, SearchLogEntry};
pub use memory::MemoryTier;
pub use provider::{Provider, ProviderError};
pub use tier::{Tier, TierGet};
