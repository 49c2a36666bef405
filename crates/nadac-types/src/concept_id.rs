//! RxNorm concept identifier (RXCUI) type.
//!
//! RXCUIs are numeric in practice, but the pipeline treats them as opaque
//! strings: they are only ever compared, hashed and used as file stems.

/// An RxNorm concept unique identifier (RXCUI).
///
/// # Examples
///
/// ```
/// use nadac_types::ConceptId;
///
/// let acetaminophen_tablet: ConceptId = "313782".to_string();
/// assert_eq!(acetaminophen_tablet, "313782");
/// ```
pub type ConceptId = String;
