//! Pappers v2 API response shapes and the mapped `EntrepriseData` record

use serde::{Deserialize, Serialize};

/// Company response from `/entreprise`
#[derive(Debug, Clone, Deserialize)]
pub struct PappersResponse {
    pub siren: String,
    #[serde(default)]
    pub siret: Option<String>,
    #[serde(default)]
    pub nom_entreprise: Option<String>,
    #[serde(default)]
    pub denomination: Option<String>,
    #[serde(default)]
    pub forme_juridique: Option<String>,
    pub siege: PappersSiege,
    #[serde(default)]
    pub dirigeants: Vec<PappersDirigeant>,
    #[serde(default)]
    pub code_naf: Option<String>,
    #[serde(default)]
    pub libelle_code_naf: Option<String>,
    #[serde(default)]
    pub effectif: Option<String>,
    #[serde(default)]
    pub date_creation: Option<String>,
    #[serde(default)]
    pub date_creation_formate: Option<String>,
    #[serde(default)]
    pub capital: Option<f64>,
    #[serde(default)]
    pub numero_rcs: Option<String>,
    #[serde(default)]
    pub greffe: Option<String>,
}

/// Head-office establishment block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PappersSiege {
    pub siret: String,
    #[serde(default)]
    pub adresse_ligne_1: Option<String>,
    #[serde(default)]
    pub adresse_ligne_2: Option<String>,
    #[serde(default)]
    pub code_postal: Option<String>,
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(default)]
    pub pays: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PappersDirigeant {
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub qualite: Option<String>,
}

/// Name search response from `/recherche`
#[derive(Debug, Clone, Deserialize)]
pub struct PappersSearchResponse {
    #[serde(default)]
    pub resultats: Vec<PappersSearchResult>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PappersSearchResult {
    pub siren: String,
    #[serde(default)]
    pub nom_entreprise: Option<String>,
    #[serde(default)]
    pub denomination: Option<String>,
    #[serde(default)]
    pub forme_juridique: Option<String>,
    pub siege: PappersSiege,
}

/// Company record as consumed by DC1/DC2 generation and cached by the
/// lookup chain. At most one record per SIRET; the SIREN is always the first
/// 9 digits of the SIRET, derivable, never independently authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrepriseData {
    pub siren: String,
    pub siret: String,
    pub nom_commercial: String,
    pub denomination_sociale: String,
    pub adresse_etablissement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forme_juridique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_naf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libelle_naf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectif: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirigeants: Vec<PappersDirigeant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_creation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_creation_formate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_rcs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greffe: Option<String>,
}

/// Join the siege address lines into one display address
pub(crate) fn format_adresse(siege: &PappersSiege) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(l1) = siege.adresse_ligne_1.as_deref() {
        parts.push(l1);
    }
    if let Some(l2) = siege.adresse_ligne_2.as_deref() {
        parts.push(l2);
    }
    let mut adresse = parts.join(", ");
    let ville = [siege.code_postal.as_deref(), siege.ville.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if !ville.is_empty() {
        if !adresse.is_empty() {
            adresse.push_str(", ");
        }
        adresse.push_str(&ville);
    }
    adresse
}

impl From<PappersResponse> for EntrepriseData {
    fn from(r: PappersResponse) -> Self {
        let adresse = format_adresse(&r.siege);
        let nom = r
            .nom_entreprise
            .clone()
            .or_else(|| r.denomination.clone())
            .unwrap_or_default();
        EntrepriseData {
            siren: r.siren.clone(),
            siret: r.siret.unwrap_or_else(|| r.siege.siret.clone()),
            nom_commercial: nom.clone(),
            denomination_sociale: r.denomination.unwrap_or(nom),
            adresse_etablissement: adresse,
            forme_juridique: r.forme_juridique,
            code_naf: r.code_naf,
            libelle_naf: r.libelle_code_naf,
            effectif: r.effectif,
            dirigeants: r.dirigeants,
            date_creation: r.date_creation,
            date_creation_formate: r.date_creation_formate,
            capital: r.capital,
            numero_rcs: r.numero_rcs,
            greffe: r.greffe,
        }
    }
}

impl From<PappersSearchResult> for EntrepriseData {
    fn from(r: PappersSearchResult) -> Self {
        let adresse = format_adresse(&r.siege);
        let nom = r
            .nom_entreprise
            .clone()
            .or_else(|| r.denomination.clone())
            .unwrap_or_default();
        EntrepriseData {
            siren: r.siren.clone(),
            siret: r.siege.siret.clone(),
            nom_commercial: nom.clone(),
            denomination_sociale: r.denomination.unwrap_or(nom),
            adresse_etablissement: adresse,
            forme_juridique: r.forme_juridique,
            code_naf: None,
            libelle_naf: None,
            effectif: None,
            dirigeants: Vec::new(),
            date_creation: None,
            date_creation_formate: None,
            capital: None,
            numero_rcs: None,
            greffe: None,
        }
    }
}
