//! RxNorm concept attribute type.
//!
//! This module provides the `ConceptAttribute` struct representing a row
//! from the RXNSAT.RRF attribute table.

use crate::{well_known, ConceptId, SuppressFlag};

/// A concept attribute from RXNSAT.RRF.
///
/// Only the columns the pipeline reads are kept.
///
/// # Examples
///
/// ```
/// use nadac_types::{ConceptAttribute, SuppressFlag};
///
/// let attribute = ConceptAttribute {
///     concept_id: "197316".to_string(),
///     attribute_name: "NDC".to_string(),
///     attribute_value: "00093410001".to_string(),
///     source: "RXNORM".to_string(),
///     suppress: SuppressFlag::NotSuppressed,
/// };
///
/// assert!(attribute.is_code());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptAttribute {
    /// The concept this attribute belongs to (RXCUI).
    pub concept_id: ConceptId,
    /// Attribute name (ATN), e.g. `NDC`, `STRENGTH`, `DF`.
    pub attribute_name: String,
    /// Attribute value (ATV).
    pub attribute_value: String,
    /// Source abbreviation (SAB), e.g. `RXNORM`, `MTHSPL`.
    pub source: String,
    /// Suppression flag of the row.
    pub suppress: SuppressFlag,
}

impl ConceptAttribute {
    /// Returns true if this attribute carries an external product code.
    pub fn is_code(&self) -> bool {
        self.attribute_name == well_known::ATN_NDC
    }

    /// Returns true if the attribute value is blank.
    pub fn is_blank(&self) -> bool {
        self.attribute_value.trim().is_empty()
    }
}
