//! Well-known RxNorm source abbreviations and attribute names.
//!
//! # Examples
//!
//! ```
//! use nadac_types::well_known;
//!
//! assert_eq!(well_known::SAB_RXNORM, "RXNORM");
//! assert!(well_known::OFFICIAL_NAME_TERM_TYPES.contains(&"SCD"));
//! ```

// =============================================================================
// Sources (SAB)
// =============================================================================

/// RxNorm's own normalized content.
pub const SAB_RXNORM: &str = "RXNORM";

/// FDA structured product labels as loaded into the Metathesaurus.
pub const SAB_MTHSPL: &str = "MTHSPL";

// =============================================================================
// Attribute names (ATN)
// =============================================================================

/// National Drug Code.
pub const ATN_NDC: &str = "NDC";

/// Labeler short name.
pub const ATN_LABELER_SHORT: &str = "LBL";

/// Manufacturer.
pub const ATN_MANUFACTURER: &str = "MANU";

/// Labeler as published in SPL data.
pub const ATN_LABELER: &str = "LABELER";

/// Strength attribute; preferred over [`ATN_SCD_STRING`].
pub const ATN_STRENGTH: &str = "STRENGTH";

/// Strength as spelled in the clinical drug string.
pub const ATN_SCD_STRING: &str = "SCD_STRING";

/// Dose form.
pub const ATN_DOSE_FORM: &str = "DF";

// =============================================================================
// Term type allow-lists
// =============================================================================

/// Term types eligible as a concept's official name, in no particular order.
///
/// `IN` is included so ingredient concepts reached through `has_ingredient`
/// have a name too.
pub const OFFICIAL_NAME_TERM_TYPES: &[&str] = &["SCD", "SBD", "PT", "SCDF", "SBDF", "IN"];
