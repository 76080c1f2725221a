//! Client for the document-extraction and market-analysis AI services
//!
//! Two expensive upstream operations live behind one HTTP service: extracting
//! DC1 pre-fill data from tender documents (RC / avis de publicité) and
//! producing a structured analysis of a BOAMP market notice. Both are always
//! reached through the cache layer; this client performs the raw calls only.

mod client;
mod error;
mod types;

pub use client::AnalyseClient;
pub use error::{AnalyseError, Result};
pub use types::{
    Acheteur, AnalyseMarche, CritereSelection, ExigencesMarche, ExtractedAcheteur,
    ExtractedCandidature, ExtractedConsultation, ExtractedDocumentData, ExtractedInformations,
    ExtractedLot, LotMarche, MarcheInfo, ScoreCompatibilite,
};
