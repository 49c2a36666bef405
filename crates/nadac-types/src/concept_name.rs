//! RxNorm concept name type.
//!
//! This module provides the `ConceptName` struct representing a row from the
//! RXNCONSO.RRF concept names table.

use crate::{ConceptId, SuppressFlag, TermType};

/// A concept name from RXNCONSO.RRF.
///
/// A concept has many names across sources and term types.
///
/// # Examples
///
/// ```
/// use nadac_types::{ConceptName, SuppressFlag, TermType};
///
/// let name = ConceptName {
///     concept_id: "313782".to_string(),
///     term_type: "SCD".to_string(),
///     name: "Acetaminophen 325 MG Oral Tablet".to_string(),
///     source: "RXNORM".to_string(),
///     suppress: SuppressFlag::NotSuppressed,
/// };
///
/// assert_eq!(name.term_type(), Some(TermType::ClinicalDrug));
/// assert!(!name.is_suppressed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptName {
    /// The concept this name belongs to (RXCUI).
    pub concept_id: ConceptId,
    /// Term type code (TTY), kept verbatim.
    pub term_type: String,
    /// The display string (STR).
    pub name: String,
    /// Source abbreviation (SAB).
    pub source: String,
    /// Suppression flag of the row.
    pub suppress: SuppressFlag,
}

impl ConceptName {
    /// Returns the parsed term type, or `None` if it is not distinguished.
    pub fn term_type(&self) -> Option<TermType> {
        TermType::from_code(&self.term_type)
    }

    /// Returns true if the row is flagged `Y` or `O`.
    pub fn is_suppressed(&self) -> bool {
        self.suppress.is_suppressed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suppressed_name() {
        let name = ConceptName {
            concept_id: "1".to_string(),
            term_type: "SBD".to_string(),
            name: "Old name".to_string(),
            source: "RXNORM".to_string(),
            suppress: SuppressFlag::Obsolete,
        };
        assert!(name.is_suppressed());
        assert_eq!(name.term_type(), Some(TermType::BrandedDrug));
    }
}
