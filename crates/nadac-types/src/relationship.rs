//! RxNorm concept relationship type.
//!
//! This module provides the `ConceptRelationship` struct representing a row
//! from the RXNREL.RRF relationship table.

use crate::{ConceptId, RelationKind};

/// A directed relationship between two concepts from RXNREL.RRF.
///
/// # Examples
///
/// ```
/// use nadac_types::{ConceptRelationship, RelationKind};
///
/// let relationship = ConceptRelationship {
///     concept_a: "197316".to_string(),
///     concept_b: "197317".to_string(),
///     relation: "tradename_of".to_string(),
///     source: "RXNORM".to_string(),
/// };
///
/// assert_eq!(relationship.kind(), Some(RelationKind::TradenameOf));
/// assert!(relationship.is_pairing());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptRelationship {
    /// First concept of the row (RXCUI1).
    pub concept_a: ConceptId,
    /// Second concept of the row (RXCUI2).
    pub concept_b: ConceptId,
    /// Relationship attribute (RELA), kept verbatim.
    pub relation: String,
    /// Source abbreviation (SAB).
    pub source: String,
}

impl ConceptRelationship {
    /// Returns the relation kind, or `None` for relations the pipeline ignores.
    pub fn kind(&self) -> Option<RelationKind> {
        RelationKind::from_code(&self.relation)
    }

    /// Returns true if this row pairs a brand with a generic.
    pub fn is_pairing(&self) -> bool {
        self.kind().is_some_and(RelationKind::is_pairing)
    }

    /// Returns true if this row links a product to its ingredient.
    pub fn is_ingredient(&self) -> bool {
        self.kind() == Some(RelationKind::HasIngredient)
    }
}
