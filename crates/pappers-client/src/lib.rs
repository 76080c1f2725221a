//! Rust client for the Pappers business registry API
//!
//! Looks up French companies by SIRET/SIREN and searches them by name
//! through the Pappers v2 API, mapping responses into the `EntrepriseData`
//! shape consumed by DC1/DC2 generation.

mod client;
mod error;
mod types;

pub use client::PappersClient;
pub use error::{PappersError, Result};
pub use types::{
    EntrepriseData, PappersDirigeant, PappersResponse, PappersSearchResponse, PappersSearchResult,
    PappersSiege,
};
