//! RXNSAT.RRF attribute table parser.

use csv::StringRecord;
use nadac_types::{ConceptAttribute, SuppressFlag};

use crate::parser::{parse, RrfRecord};
use crate::types::{AttributeConfig, RrfConfig, RrfResult};

/// Columns of RXNSAT.RRF.
const ATTRIBUTE_COLUMNS: &[&str] = &[
    "RXCUI", "LUI", "SUI", "RXAUI", "STYPE", "CODE", "ATUI", "SATUI", "ATN", "SAB", "ATV",
    "SUPPRESS", "CVF",
];

impl RrfRecord for ConceptAttribute {
    const TABLE: &'static str = "RXNSAT";
    const COLUMNS: &'static [&'static str] = ATTRIBUTE_COLUMNS;

    fn from_record(record: &StringRecord) -> RrfResult<Self> {
        Ok(ConceptAttribute {
            concept_id: parse::owned(record, 0),
            attribute_name: parse::owned(record, 8),
            source: parse::owned(record, 9),
            attribute_value: parse::owned(record, 10),
            suppress: SuppressFlag::from_code(parse::field(record, 11)),
        })
    }

    fn passes_filter(&self, config: &RrfConfig) -> bool {
        if config.exclude_suppressed && self.suppress.is_suppressed() {
            return false;
        }
        config.accepts_source(&self.source)
    }
}

/// Extended filter for attributes with attribute-name filtering.
pub trait AttributeFilter {
    /// Returns true if the attribute passes the extended filter.
    fn passes_attribute_filter(&self, config: &AttributeConfig) -> bool;
}

impl AttributeFilter for ConceptAttribute {
    fn passes_attribute_filter(&self, config: &AttributeConfig) -> bool {
        if !self.passes_filter(&config.base) || self.is_blank() {
            return false;
        }
        config.priority_of(&self.attribute_name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(fields: &[&str]) -> StringRecord {
        let mut record = StringRecord::new();
        for field in fields {
            record.push_field(field);
        }
        record
    }

    fn make_attribute(name: &str, source: &str) -> ConceptAttribute {
        ConceptAttribute {
            concept_id: "197316".to_string(),
            attribute_name: name.to_string(),
            attribute_value: "value".to_string(),
            source: source.to_string(),
            suppress: SuppressFlag::NotSuppressed,
        }
    }

    #[test]
    fn test_parse_attribute_record() {
        let record = make_record(&[
            "197316", "", "", "1234567", "CUI", "197316", "AT123", "", "NDC", "RXNORM",
            "00093410001", "N", "4096", "",
        ]);

        let attribute = ConceptAttribute::from_record(&record).unwrap();
        assert_eq!(attribute.concept_id, "197316");
        assert_eq!(attribute.attribute_name, "NDC");
        assert_eq!(attribute.source, "RXNORM");
        assert_eq!(attribute.attribute_value, "00093410001");
        assert_eq!(attribute.suppress, SuppressFlag::NotSuppressed);
        assert!(attribute.is_code());
    }

    #[test]
    fn test_manufacturer_filter() {
        let config = AttributeConfig::manufacturers();
        assert!(make_attribute("LBL", "RXNORM").passes_attribute_filter(&config));
        assert!(make_attribute("MANU", "MTHSPL").passes_attribute_filter(&config));
        assert!(!make_attribute("LBL", "VANDF").passes_attribute_filter(&config));
        assert!(!make_attribute("NDC", "RXNORM").passes_attribute_filter(&config));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut attribute = make_attribute("DF", "RXNORM");
        attribute.attribute_value = " ".to_string();
        assert!(!attribute.passes_attribute_filter(&AttributeConfig::dose_forms()));
    }
}
