//! NADAC price observation type.
//!
//! One row of the NADAC comparison file. Price and date are kept as the raw
//! strings found in the file; validating them is the resolver's job so that
//! bad rows become counted drops instead of load failures.

use crate::Classification;

/// A single NADAC price row.
///
/// # Examples
///
/// ```
/// use nadac_types::{Classification, PriceObservation};
///
/// let observation = PriceObservation {
///     external_code: "0093-4100-01".to_string(),
///     raw_name: "AMOXICILLIN 500 MG CAPSULE".to_string(),
///     unit_price: "1.55".to_string(),
///     effective_date: "2025-10-01".to_string(),
///     classification: Classification::Brand,
/// };
///
/// assert!(observation.is_brand());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceObservation {
    /// Product code as published (NDC, possibly with separators).
    pub external_code: String,
    /// NDC description from the price file.
    pub raw_name: String,
    /// Per-unit price, unparsed.
    pub unit_price: String,
    /// Effective date, unparsed.
    pub effective_date: String,
    /// Rate-setting classification.
    pub classification: Classification,
}

impl PriceObservation {
    /// Returns true if the row is classified as a brand product.
    pub fn is_brand(&self) -> bool {
        self.classification.is_brand()
    }
}
