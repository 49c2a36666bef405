//! Search indexes derived from emitted drug records.

use std::collections::{BTreeMap, HashMap};

use nadac_types::{ConceptId, DrugRecord, PairEntry, PairRole, SearchIndexEntry};

use crate::index::ReferenceIndex;

const UNKNOWN_BRAND: &str = "Unknown Brand";
const UNKNOWN_GENERIC: &str = "Unknown Generic";

/// The three front-end indexes, rebuilt from scratch every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Every record, keyed by concept id.
    pub all: BTreeMap<ConceptId, SearchIndexEntry>,
    /// Records with a distinct brand/generic pair, keyed by
    /// `"<lower-cased name> [BRAND|GENERIC]"`.
    pub has_pair: BTreeMap<String, SearchIndexEntry>,
    /// Both sides of every pair, keyed by concept id.
    pub comparison: BTreeMap<ConceptId, PairEntry>,
}

impl Catalog {
    /// Builds the indexes from the records that were written.
    ///
    /// Partner names come from the official name map, then from the partner's
    /// own emitted record.
    pub fn build(records: &[DrugRecord], index: &ReferenceIndex) -> Self {
        let emitted: HashMap<&str, &DrugRecord> = records
            .iter()
            .map(|record| (record.concept_id.as_str(), record))
            .collect();

        let name_of = |concept_id: &str| -> Option<String> {
            index
                .official_name(concept_id)
                .map(str::to_string)
                .or_else(|| {
                    emitted
                        .get(concept_id)
                        .map(|record| record.display_name.clone())
                        .filter(|name| !name.is_empty())
                })
        };

        let mut catalog = Self::default();

        for record in records {
            if let (Some(brand), Some(generic)) = (&record.paired_brand_id, &record.paired_generic_id) {
                if brand != generic {
                    let brand_name = name_of(brand).unwrap_or_else(|| UNKNOWN_BRAND.to_string());
                    let generic_name =
                        name_of(generic).unwrap_or_else(|| UNKNOWN_GENERIC.to_string());

                    catalog.comparison.insert(
                        brand.clone(),
                        PairEntry {
                            concept_id: brand.clone(),
                            name: brand_name.clone(),
                            partner_id: generic.clone(),
                            partner_name: generic_name.clone(),
                            role: PairRole::Brand,
                        },
                    );
                    catalog.comparison.insert(
                        generic.clone(),
                        PairEntry {
                            concept_id: generic.clone(),
                            name: generic_name,
                            partner_id: brand.clone(),
                            partner_name: brand_name,
                            role: PairRole::Generic,
                        },
                    );
                }
            }

            if record.display_name.is_empty() {
                continue;
            }

            let partner_id = record.partner_id().cloned();
            let entry = SearchIndexEntry {
                concept_id: record.concept_id.clone(),
                name: record.display_name.clone(),
                is_brand: record.is_brand,
                partner_name: partner_id
                    .as_deref()
                    .and_then(|id| name_of(id))
                    .unwrap_or_default(),
                partner_id,
                ingredient_name: record.ingredient_name.clone(),
                manufacturer_name: record.manufacturer_name.clone(),
            };

            if record.has_distinct_pair() {
                catalog
                    .has_pair
                    .insert(entry.search_key(record.is_brand_side()), entry.clone());
            }
            catalog.all.insert(record.concept_id.clone(), entry);
        }

        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: &str, name: &str, brand: Option<&str>, generic: Option<&str>) -> DrugRecord {
        DrugRecord {
            paired_brand_id: brand.map(str::to_string),
            paired_generic_id: generic.map(str::to_string),
            ..DrugRecord::new(id.to_string(), name.to_string(), brand == Some(id))
        }
    }

    #[test]
    fn test_pair_produces_symmetric_entries() {
        let records = vec![
            make_record("10", "Brand 5 MG Tablet", Some("10"), Some("20")),
            make_record("20", "Generic 5 MG Tablet", Some("10"), Some("20")),
        ];
        let catalog = Catalog::build(&records, &ReferenceIndex::new());

        assert_eq!(catalog.comparison.len(), 2);
        let brand = &catalog.comparison["10"];
        assert_eq!(brand.role, PairRole::Brand);
        assert_eq!(brand.partner_id, "20");
        assert_eq!(brand.partner_name, "Generic 5 MG Tablet");
        let generic = &catalog.comparison["20"];
        assert_eq!(generic.role, PairRole::Generic);
        assert_eq!(generic.partner_name, "Brand 5 MG Tablet");

        assert_eq!(catalog.has_pair.len(), 2);
        assert!(catalog.has_pair.contains_key("brand 5 mg tablet [BRAND]"));
        assert!(catalog.has_pair.contains_key("generic 5 mg tablet [GENERIC]"));
        assert_eq!(catalog.all["10"].partner_id.as_deref(), Some("20"));
        assert_eq!(catalog.all["20"].partner_id.as_deref(), Some("10"));
    }

    #[test]
    fn test_unknown_partner_names() {
        let records = vec![make_record("10", "Brand", Some("10"), Some("99"))];
        let catalog = Catalog::build(&records, &ReferenceIndex::new());

        assert_eq!(catalog.comparison["10"].partner_name, UNKNOWN_GENERIC);
        assert_eq!(catalog.comparison["99"].name, UNKNOWN_GENERIC);
        assert_eq!(catalog.comparison["99"].partner_name, "Brand");
        assert_eq!(catalog.all["10"].partner_name, "");
    }

    #[test]
    fn test_unpaired_records_only_in_full_catalog() {
        let records = vec![
            make_record("1", "Solo", None, Some("1")),
            make_record("2", "Self", Some("2"), Some("2")),
            make_record("3", "", None, Some("3")),
        ];
        let catalog = Catalog::build(&records, &ReferenceIndex::new());

        assert_eq!(catalog.all.len(), 2);
        assert!(catalog.has_pair.is_empty());
        assert!(catalog.comparison.is_empty());
        assert_eq!(catalog.all["1"].partner_id, None);
    }
}
