//! Structured analysis payloads

use serde::{Deserialize, Serialize};

/// DC1 pre-fill data extracted from a tender document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocumentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acheteur: Option<ExtractedAcheteur>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation: Option<ExtractedConsultation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidature: Option<ExtractedCandidature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub informations: Option<ExtractedInformations>,
    /// Extraction confidence, 0-100
    pub confidence: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedAcheteur {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_avis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_dossier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedConsultation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedCandidature {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lots: Vec<ExtractedLot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedLot {
    pub numero: String,
    pub intitule: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedInformations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_limite_reponse: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteres_selection: Vec<String>,
}

/// Structured analysis of a BOAMP market notice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyseMarche {
    pub marche_id: String,
    pub acheteur: Acheteur,
    pub marche: MarcheInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lots: Vec<LotMarche>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents_requis: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteres_selection: Vec<CritereSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exigences: Option<ExigencesMarche>,
    pub score_compatibilite: ScoreCompatibilite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acheteur {
    pub nom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarcheInfo {
    pub titre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_publication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_limite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub montant_estime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotMarche {
    pub numero: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CritereSelection {
    pub critere: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ponderation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExigencesMarche {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_minimum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectif_minimum: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_geographique: Option<String>,
}

/// Generic/personalized compatibility scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCompatibilite {
    pub score_generique: i32,
    pub niveau: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_generique: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points_cles: Vec<String>,
}
