//! Canonical cache key derivation
//!
//! Every lookup request maps to exactly one namespaced key, so logically
//! identical requests collide regardless of how the identifier was typed.

use sha2::{Digest, Sha256};
use std::fmt;

/// Resource types served by the lookup chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Company record keyed by SIRET
    Entreprise,
    /// Fuzzy company name search keyed by normalized query
    EntrepriseSearch,
    /// Document analysis keyed by content hash
    DocumentAnalysis,
    /// Market analysis keyed by BOAMP market id
    MarcheAnalysis,
}

impl ResourceType {
    /// Key namespace prefix, one per resource so types can never collide
    pub fn namespace(&self) -> &'static str {
        match self {
            ResourceType::Entreprise => "entreprise",
            ResourceType::EntrepriseSearch => "recherche",
            ResourceType::DocumentAnalysis => "document",
            ResourceType::MarcheAnalysis => "analyse",
        }
    }

    /// Short name used in search logs
    pub fn log_name(&self) -> &'static str {
        match self {
            ResourceType::Entreprise => "siret",
            ResourceType::EntrepriseSearch => "nom",
            ResourceType::DocumentAnalysis => "document",
            ResourceType::MarcheAnalysis => "marche",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// A canonical, namespaced storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the canonical key for a (resource, identifier) pair.
    ///
    /// Normalization rules:
    /// - SIRET/SIREN and market ids: whitespace stripped
    /// - search queries: lower-cased and trimmed
    /// - document identifiers: SHA-256 of the raw bytes
    pub fn derive(resource: ResourceType, identifier: &str) -> Self {
        let normalized = match resource {
            ResourceType::Entreprise => {
                identifier.chars().filter(|c| !c.is_whitespace()).collect()
            }
            ResourceType::EntrepriseSearch => identifier.trim().to_lowercase(),
            ResourceType::DocumentAnalysis => content_hash(identifier.as_bytes()),
            ResourceType::MarcheAnalysis => identifier.trim().to_string(),
        };
        CacheKey(format!("{}:{}", resource.namespace(), normalized))
    }

    /// Derive a content-addressed key directly from document bytes
    pub fn for_document(bytes: &[u8]) -> Self {
        Self::for_document_hash(&content_hash(bytes))
    }

    /// Rebuild a document key from an already-computed content hash
    pub fn for_document_hash(hash: &str) -> Self {
        CacheKey(format!(
            "{}:{}",
            ResourceType::DocumentAnalysis.namespace(),
            hash
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalized identifier after the namespace prefix
    pub fn id(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase hex SHA-256 digest of raw bytes
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siret_whitespace_is_stripped() {
        let a = CacheKey::derive(ResourceType::Entreprise, "732 829 320 00074");
        let b = CacheKey::derive(ResourceType::Entreprise, "73282932000074");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "entreprise:73282932000074");
    }

    #[test]
    fn test_search_query_is_normalized() {
        let a = CacheKey::derive(ResourceType::EntrepriseSearch, "  Boulangerie DUPONT ");
        let b = CacheKey::derive(ResourceType::EntrepriseSearch, "boulangerie dupont");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "recherche:boulangerie dupont");
    }

    #[test]
    fn test_namespaces_never_collide() {
        let a = CacheKey::derive(ResourceType::Entreprise, "123");
        let b = CacheKey::derive(ResourceType::MarcheAnalysis, "123");
        assert_ne!(a, b);
    }

    #[test]
    fn test_document_key_is_content_addressed() {
        let a = CacheKey::for_document(b"identical bytes");
        let b = CacheKey::for_document(b"identical bytes");
        let c = CacheKey::for_document(b"different bytes");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("document:"));
        // SHA-256 hex is 64 chars
        assert_eq!(a.as_str().len(), "document:".len() + 64);
    }

    #[test]
    fn test_marche_key_uses_id_verbatim() {
        let key = CacheKey::derive(ResourceType::MarcheAnalysis, " 24-123456 ");
        assert_eq!(key.as_str(), "analyse:24-123456");
    }
}
