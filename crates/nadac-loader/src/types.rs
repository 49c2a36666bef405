//! Loader-specific types for RRF and NADAC file processing.

use std::path::PathBuf;
use thiserror::Error;

use nadac_types::well_known;

/// Errors that can occur while loading input files or writing outputs.
#[derive(Error, Debug)]
pub enum RrfError {
    /// I/O error reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required input file missing from the data directory.
    #[error("Required input file not found: {file_type} in {directory}")]
    RequiredFileMissing {
        /// The kind of file that was missing.
        file_type: String,
        /// The directory that was searched.
        directory: String,
    },

    /// The file does not have the layout the loader expects.
    #[error("Schema mismatch in {file}: expected {expected}, found {found}")]
    SchemaMismatch {
        /// The file being read.
        file: String,
        /// Expected schema, human readable.
        expected: String,
        /// Schema actually found.
        found: String,
    },

    /// A single row with the wrong number of fields (non-fatal).
    #[error("Row {line}: expected {expected} fields, found {found}")]
    InvalidRow {
        /// 1-based row number.
        line: u64,
        /// Expected field count.
        expected: usize,
        /// Found field count.
        found: usize,
    },
}

/// Result type for loader operations.
pub type RrfResult<T> = Result<T, RrfError>;

/// Base configuration applied while parsing any RRF table.
#[derive(Debug, Clone, Default)]
pub struct RrfConfig {
    /// Drop rows whose suppression flag is `Y` or `O`.
    pub exclude_suppressed: bool,
    /// Source abbreviations to keep (empty = all sources).
    pub sources: Vec<String>,
}

impl RrfConfig {
    /// Keeps only rows from the given sources.
    pub fn sources(sources: &[&str]) -> Self {
        Self {
            exclude_suppressed: false,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Returns true if `source` passes the source filter.
    pub fn accepts_source(&self, source: &str) -> bool {
        self.sources.is_empty() || self.sources.iter().any(|s| s == source)
    }
}

/// Configuration for selecting attribute rows.
#[derive(Debug, Clone, Default)]
pub struct AttributeConfig {
    /// Base RRF configuration.
    pub base: RrfConfig,
    /// Attribute names to include (empty = all names).
    pub attribute_names: Vec<String>,
}

impl AttributeConfig {
    fn named(names: &[&str], base: RrfConfig) -> Self {
        Self {
            base,
            attribute_names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// NDC attributes from any source.
    pub fn codes() -> Self {
        Self::named(&[well_known::ATN_NDC], RrfConfig::default())
    }

    /// Labeler and manufacturer attributes from RxNorm and SPL.
    pub fn manufacturers() -> Self {
        Self::named(
            &[
                well_known::ATN_LABELER_SHORT,
                well_known::ATN_MANUFACTURER,
                well_known::ATN_LABELER,
            ],
            RrfConfig::sources(&[well_known::SAB_RXNORM, well_known::SAB_MTHSPL]),
        )
    }

    /// Strength attributes, listed in priority order.
    pub fn strengths() -> Self {
        Self::named(
            &[well_known::ATN_STRENGTH, well_known::ATN_SCD_STRING],
            RrfConfig::default(),
        )
    }

    /// Dose form attributes.
    pub fn dose_forms() -> Self {
        Self::named(&[well_known::ATN_DOSE_FORM], RrfConfig::default())
    }

    /// Position of `name` in the allow-list, used as its priority.
    pub fn priority_of(&self, name: &str) -> Option<usize> {
        if self.attribute_names.is_empty() {
            return Some(0);
        }
        self.attribute_names.iter().position(|n| n == name)
    }
}

/// Configuration for selecting concept name rows.
#[derive(Debug, Clone, Default)]
pub struct NameConfig {
    /// Base RRF configuration.
    pub base: RrfConfig,
    /// Term types to include (empty = all term types).
    pub term_types: Vec<String>,
}

impl NameConfig {
    /// Non-suppressed RxNorm names of the official term types, listed in
    /// priority order.
    pub fn official_names() -> Self {
        Self {
            base: RrfConfig {
                exclude_suppressed: true,
                sources: vec![well_known::SAB_RXNORM.to_string()],
            },
            term_types: well_known::OFFICIAL_NAME_TERM_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Position of `term_type` in the allow-list, used as its priority.
    pub fn priority_of(&self, term_type: &str) -> Option<usize> {
        if self.term_types.is_empty() {
            return Some(0);
        }
        self.term_types.iter().position(|t| t == term_type)
    }

    /// Any RxNorm name; only used to learn each concept's term type.
    pub fn term_types() -> Self {
        Self {
            base: RrfConfig::sources(&[well_known::SAB_RXNORM]),
            term_types: vec![],
        }
    }
}

/// Configuration for selecting relationship rows.
#[derive(Debug, Clone, Default)]
pub struct RelationshipConfig {
    /// Base RRF configuration.
    pub base: RrfConfig,
    /// Relationship attributes (RELA) to include (empty = all).
    pub relations: Vec<String>,
}

impl RelationshipConfig {
    /// The four brand/generic pairing relations asserted by RxNorm.
    pub fn pairing() -> Self {
        Self {
            base: RrfConfig::sources(&[well_known::SAB_RXNORM]),
            relations: ["tradename_of", "brand_name_of", "has_tradename", "has_brand_name"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Product to ingredient relations asserted by RxNorm.
    pub fn ingredients() -> Self {
        Self {
            base: RrfConfig::sources(&[well_known::SAB_RXNORM]),
            relations: vec!["has_ingredient".to_string()],
        }
    }
}

/// Row selection for every lookup table of the reference index.
///
/// `Default` gives the RxNorm presets.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Rows feeding the product code map.
    pub codes: AttributeConfig,
    /// Rows feeding the manufacturer map.
    pub manufacturers: AttributeConfig,
    /// Rows feeding the strength map, in priority order.
    pub strengths: AttributeConfig,
    /// Rows feeding the dose form map.
    pub dose_forms: AttributeConfig,
    /// Rows feeding the official name map.
    pub official_names: NameConfig,
    /// Rows feeding the term type map.
    pub term_types: NameConfig,
    /// Rows feeding the brand/generic maps.
    pub pairing: RelationshipConfig,
    /// Rows feeding the product to ingredient map.
    pub ingredients: RelationshipConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            codes: AttributeConfig::codes(),
            manufacturers: AttributeConfig::manufacturers(),
            strengths: AttributeConfig::strengths(),
            dose_forms: AttributeConfig::dose_forms(),
            official_names: NameConfig::official_names(),
            term_types: NameConfig::term_types(),
            pairing: RelationshipConfig::pairing(),
            ingredients: RelationshipConfig::ingredients(),
        }
    }
}

/// Statistics from parsing one input file.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    /// Total records read from file.
    pub total_records: usize,
    /// Records that passed filters.
    pub filtered_records: usize,
    /// Records skipped by filters.
    pub skipped_records: usize,
    /// Malformed rows encountered (non-fatal).
    pub error_count: usize,
    /// Time taken to parse in milliseconds.
    pub parse_time_ms: u64,
}

impl ParseStats {
    /// Returns the percentage of records that passed filters.
    pub fn filter_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.filtered_records as f64 / self.total_records as f64) * 100.0
        }
    }
}

/// Discovered input files in a data directory.
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    /// Path to RXNSAT.RRF.
    pub attribute_file: Option<PathBuf>,
    /// Path to RXNCONSO.RRF.
    pub name_file: Option<PathBuf>,
    /// Path to RXNREL.RRF.
    pub relationship_file: Option<PathBuf>,
    /// Path to the NADAC price file.
    pub price_file: Option<PathBuf>,
}

impl InputFiles {
    /// Creates a new empty InputFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the price file is present; reference files are optional.
    pub fn has_required_files(&self) -> bool {
        self.price_file.is_some()
    }

    /// Returns the reference tables that were not found.
    pub fn missing_reference_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.attribute_file.is_none() {
            missing.push("RXNSAT");
        }
        if self.name_file.is_none() {
            missing.push("RXNCONSO");
        }
        if self.relationship_file.is_none() {
            missing.push("RXNREL");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rrf_config_default_accepts_everything() {
        let config = RrfConfig::default();
        assert!(!config.exclude_suppressed);
        assert!(config.accepts_source("MTHSPL"));
    }

    #[test]
    fn test_official_names_config() {
        let config = NameConfig::official_names();
        assert!(config.base.exclude_suppressed);
        assert_eq!(config.base.sources, vec!["RXNORM"]);
        assert_eq!(config.term_types.len(), 6);
    }

    #[test]
    fn test_strength_priority() {
        let config = AttributeConfig::strengths();
        assert_eq!(config.priority_of("STRENGTH"), Some(0));
        assert_eq!(config.priority_of("SCD_STRING"), Some(1));
        assert_eq!(config.priority_of("DF"), None);
    }

    #[test]
    fn test_manufacturer_sources() {
        let config = AttributeConfig::manufacturers();
        assert!(config.base.accepts_source("MTHSPL"));
        assert!(!config.base.accepts_source("VANDF"));
    }

    #[test]
    fn test_parse_stats_filter_rate() {
        let stats = ParseStats {
            total_records: 100,
            filtered_records: 75,
            ..Default::default()
        };
        assert!((stats.filter_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_input_files_missing() {
        let files = InputFiles {
            price_file: Some(PathBuf::from("nadac-comparison.csv")),
            attribute_file: Some(PathBuf::from("RXNSAT.RRF")),
            ..Default::default()
        };

        assert!(files.has_required_files());
        let missing = files.missing_reference_files();
        assert_eq!(missing, vec!["RXNCONSO", "RXNREL"]);
    }
}
