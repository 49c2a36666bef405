//! Per-concept drug price record.
//!
//! A `DrugRecord` is the unit of persistence: one JSON file per RXCUI. Field
//! names on the wire follow the layout the static front-end reads.

use std::collections::BTreeMap;

use crate::{ConceptId, FormCategory};

/// Prices keyed by canonical product code, then by effective date.
pub type PriceHistory = BTreeMap<String, BTreeMap<String, f64>>;

/// Aggregated price record for one concept.
///
/// # Examples
///
/// ```
/// use nadac_types::DrugRecord;
///
/// let mut record = DrugRecord::new("197316".to_string(), "Drug 10 MG Oral Tablet".to_string(), true);
/// record.insert_price("00093410001", "2025-10-01", 1.55);
/// record.insert_price("00093410001", "2025-10-01", 1.60);
///
/// assert_eq!(record.price("00093410001", "2025-10-01"), Some(1.60));
/// assert_eq!(record.observation_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrugRecord {
    /// Concept identifier (RXCUI).
    #[cfg_attr(feature = "serde", serde(rename = "RxCUI"))]
    pub concept_id: ConceptId,
    /// Official name when known, otherwise the NADAC description.
    #[cfg_attr(feature = "serde", serde(rename = "Name"))]
    pub display_name: String,
    /// Whether the first observation for this concept was brand-classified.
    #[cfg_attr(feature = "serde", serde(rename = "IsBrand"))]
    pub is_brand: bool,
    /// Brand side of the pairing (self for brands).
    #[cfg_attr(feature = "serde", serde(rename = "Brand_Mate_RxCUI"))]
    pub paired_brand_id: Option<ConceptId>,
    /// Generic side of the pairing (self for generics).
    #[cfg_attr(feature = "serde", serde(rename = "Generic_Mate_RxCUI"))]
    pub paired_generic_id: Option<ConceptId>,
    /// Title-cased active ingredient name.
    #[cfg_attr(feature = "serde", serde(rename = "Ingredient_Name"))]
    pub ingredient_name: String,
    /// Labeler or brand marker.
    #[cfg_attr(feature = "serde", serde(rename = "Manufacturer_Name"))]
    pub manufacturer_name: String,
    /// Strength such as `500 MG`.
    #[cfg_attr(feature = "serde", serde(rename = "Strength"))]
    pub strength: String,
    /// Dosage form such as `Oral Tablet`.
    #[cfg_attr(feature = "serde", serde(rename = "Form"))]
    pub form: String,
    /// Display bucket derived from `form`.
    #[cfg_attr(feature = "serde", serde(rename = "Form_Category"))]
    pub form_category: FormCategory,
    /// Price history.
    pub prices: PriceHistory,
}

impl DrugRecord {
    /// Creates an empty record for a concept.
    pub fn new(concept_id: ConceptId, display_name: String, is_brand: bool) -> Self {
        Self {
            concept_id,
            display_name,
            is_brand,
            ..Default::default()
        }
    }

    /// Records a price; an existing price for the same code and date is replaced.
    pub fn insert_price(&mut self, code: &str, date: &str, price: f64) {
        self.prices
            .entry(code.to_string())
            .or_default()
            .insert(date.to_string(), price);
    }

    /// Looks up the price for a code and date.
    pub fn price(&self, code: &str, date: &str) -> Option<f64> {
        self.prices.get(code)?.get(date).copied()
    }

    /// Number of distinct (code, date) observations.
    pub fn observation_count(&self) -> usize {
        self.prices.values().map(|dates| dates.len()).sum()
    }

    /// Returns the partner concept: the generic for a brand, the brand for a generic.
    pub fn partner_id(&self) -> Option<&ConceptId> {
        if self.is_brand_side() {
            self.paired_generic_id.as_ref()
        } else {
            self.paired_brand_id.as_ref()
        }
    }

    /// True when this concept is the brand side of its pairing.
    pub fn is_brand_side(&self) -> bool {
        self.paired_brand_id.as_deref() == Some(self.concept_id.as_str())
            && self.paired_brand_id != self.paired_generic_id
    }

    /// True when both sides of the pairing are known and distinct.
    pub fn has_distinct_pair(&self) -> bool {
        match (&self.paired_brand_id, &self.paired_generic_id) {
            (Some(brand), Some(generic)) => brand != generic,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(brand: Option<&str>, generic: Option<&str>) -> DrugRecord {
        DrugRecord {
            paired_brand_id: brand.map(str::to_string),
            paired_generic_id: generic.map(str::to_string),
            ..DrugRecord::new("10".to_string(), "Drug".to_string(), true)
        }
    }

    #[test]
    fn test_price_last_write_wins() {
        let mut record = DrugRecord::new("1".to_string(), "X".to_string(), false);
        record.insert_price("A", "2025-01-01", 1.00);
        record.insert_price("A", "2025-01-01", 1.20);
        record.insert_price("A", "2025-02-01", 1.30);
        assert_eq!(record.price("A", "2025-01-01"), Some(1.20));
        assert_eq!(record.observation_count(), 2);
        assert_eq!(record.price("B", "2025-01-01"), None);
    }

    #[test]
    fn test_pair_sides() {
        let brand = make_record(Some("10"), Some("20"));
        assert!(brand.is_brand_side());
        assert!(brand.has_distinct_pair());
        assert_eq!(brand.partner_id().map(String::as_str), Some("20"));

        let generic = DrugRecord {
            concept_id: "20".to_string(),
            ..make_record(Some("10"), Some("20"))
        };
        assert!(!generic.is_brand_side());
        assert_eq!(generic.partner_id().map(String::as_str), Some("10"));

        let unpaired = make_record(Some("10"), None);
        assert!(unpaired.is_brand_side());
        assert!(!unpaired.has_distinct_pair());
        assert_eq!(unpaired.partner_id(), None);
    }
}
