//! RXNREL.RRF relationship table parser.

use csv::StringRecord;
use nadac_types::ConceptRelationship;

use crate::parser::{parse, RrfRecord};
use crate::types::{RelationshipConfig, RrfConfig, RrfResult};

/// Columns of RXNREL.RRF.
const RELATIONSHIP_COLUMNS: &[&str] = &[
    "RXCUI1", "RXAUI1", "STYPE1", "REL", "RXCUI2", "RXAUI2", "STYPE2", "RELA", "RUI", "SRUI",
    "SAB", "SL", "DIR", "RG", "SUPPRESS", "CVF",
];

impl RrfRecord for ConceptRelationship {
    const TABLE: &'static str = "RXNREL";
    const COLUMNS: &'static [&'static str] = RELATIONSHIP_COLUMNS;

    fn from_record(record: &StringRecord) -> RrfResult<Self> {
        Ok(ConceptRelationship {
            concept_a: parse::owned(record, 0),
            concept_b: parse::owned(record, 4),
            relation: parse::owned(record, 7),
            source: parse::owned(record, 10),
        })
    }

    fn passes_filter(&self, config: &RrfConfig) -> bool {
        config.accepts_source(&self.source)
    }
}

/// Extended filter for relationships with RELA filtering.
pub trait RelationshipFilter {
    /// Returns true if the relationship passes the extended filter.
    fn passes_relationship_filter(&self, config: &RelationshipConfig) -> bool;
}

impl RelationshipFilter for ConceptRelationship {
    fn passes_relationship_filter(&self, config: &RelationshipConfig) -> bool {
        if !self.passes_filter(&config.base) {
            return false;
        }

        if self.concept_a.is_empty() || self.concept_b.is_empty() {
            return false;
        }

        if !config.relations.is_empty() && !config.relations.contains(&self.relation) {
            return false;
        }

        true
    }
}
