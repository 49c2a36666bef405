//! RXNCONSO.RRF concept names parser.

use csv::StringRecord;
use nadac_types::{ConceptName, SuppressFlag};

use crate::parser::{parse, RrfRecord};
use crate::types::{NameConfig, RrfConfig, RrfResult};

/// Columns of RXNCONSO.RRF.
const NAME_COLUMNS: &[&str] = &[
    "RXCUI", "LAT", "TS", "LUI", "STT", "SUI", "ISPREF", "RXAUI", "SAUI", "SCUI", "SDUI", "SAB",
    "TTY", "CODE", "STR", "SRL", "SUPPRESS", "CVF",
];

impl RrfRecord for ConceptName {
    const TABLE: &'static str = "RXNCONSO";
    const COLUMNS: &'static [&'static str] = NAME_COLUMNS;

    fn from_record(record: &StringRecord) -> RrfResult<Self> {
        Ok(ConceptName {
            concept_id: parse::owned(record, 0),
            source: parse::owned(record, 11),
            term_type: parse::owned(record, 12),
            name: parse::owned(record, 14),
            suppress: SuppressFlag::from_code(parse::field(record, 16)),
        })
    }

    fn passes_filter(&self, config: &RrfConfig) -> bool {
        if config.exclude_suppressed && self.is_suppressed() {
            return false;
        }
        config.accepts_source(&self.source)
    }
}

/// Extended filter for names with term-type filtering.
pub trait NameFilter {
    /// Returns true if the name passes the extended filter.
    fn passes_name_filter(&self, config: &NameConfig) -> bool;
}

impl NameFilter for ConceptName {
    fn passes_name_filter(&self, config: &NameConfig) -> bool {
        if !self.passes_filter(&config.base) {
            return false;
        }

        if !config.term_types.is_empty() && !config.term_types.contains(&self.term_type) {
            return false;
        }

        true
    }
}
