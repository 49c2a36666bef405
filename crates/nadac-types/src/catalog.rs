//! Search index projections of drug records.

use crate::{ConceptId, PairRole};

/// Summary of a drug record used by the search indexes.
///
/// # Examples
///
/// ```
/// use nadac_types::SearchIndexEntry;
///
/// let entry = SearchIndexEntry {
///     concept_id: "197316".to_string(),
///     name: "Drug 10 MG Oral Tablet [Brand]".to_string(),
///     is_brand: true,
///     partner_id: Some("197317".to_string()),
///     partner_name: "Drug 10 MG Oral Tablet".to_string(),
///     ingredient_name: "Drug".to_string(),
///     manufacturer_name: "Brand".to_string(),
/// };
///
/// assert_eq!(entry.search_key(true), "drug 10 mg oral tablet [brand] [BRAND]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchIndexEntry {
    /// Concept identifier.
    #[cfg_attr(feature = "serde", serde(rename = "rxcui"))]
    pub concept_id: ConceptId,
    /// Display name.
    pub name: String,
    /// Brand classification of the record.
    pub is_brand: bool,
    /// The other side of the pairing, if any.
    #[cfg_attr(feature = "serde", serde(rename = "mate_rxcui"))]
    pub partner_id: Option<ConceptId>,
    /// Display name of the partner, empty when unknown.
    #[cfg_attr(feature = "serde", serde(rename = "mate_name"))]
    pub partner_name: String,
    /// Title-cased ingredient name.
    pub ingredient_name: String,
    /// Manufacturer name.
    pub manufacturer_name: String,
}

impl SearchIndexEntry {
    /// Composite key for the paired-only index: lower-cased name plus side tag.
    pub fn search_key(&self, brand_side: bool) -> String {
        let role = if brand_side {
            PairRole::Brand
        } else {
            PairRole::Generic
        };
        format!("{} [{}]", self.name.to_lowercase(), role.tag())
    }
}

/// One side of a brand/generic pair in the comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairEntry {
    /// This side's concept.
    #[cfg_attr(feature = "serde", serde(rename = "rxcui"))]
    pub concept_id: ConceptId,
    /// This side's name.
    pub name: String,
    /// The partner concept.
    #[cfg_attr(feature = "serde", serde(rename = "mate_rxcui"))]
    pub partner_id: ConceptId,
    /// The partner's name.
    #[cfg_attr(feature = "serde", serde(rename = "mate_name"))]
    pub partner_name: String,
    /// Which side this entry describes.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub role: PairRole,
}
