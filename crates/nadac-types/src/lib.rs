//! # nadac-types
//!
//! Type definitions for joining NADAC drug prices against RxNorm.
//!
//! This crate provides Rust types for the RxNorm Rich Release Format (RRF)
//! rows the pipeline reads (attributes, relationships, concept names), the
//! NADAC price rows, and the records and indexes it writes.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use nadac_types::{canonicalize_code, Classification, PriceObservation, TermType};
//!
//! let observation = PriceObservation {
//!     external_code: "0093-4100-01".to_string(),
//!     raw_name: "AMOXICILLIN 500 MG CAPSULE".to_string(),
//!     unit_price: "0.10".to_string(),
//!     effective_date: "2025-10-01".to_string(),
//!     classification: Classification::from_flag("G"),
//! };
//!
//! assert_eq!(canonicalize_code(&observation.external_code), "00093410001");
//! assert!(TermType::ClinicalDrug.pairing_rank() < TermType::Ingredient.pairing_rank());
//! ```

#![warn(missing_docs)]

mod attribute;
mod catalog;
mod code;
mod concept_id;
mod concept_name;
mod drug;
mod enums;
mod observation;
mod relationship;
pub mod well_known;

// Re-export all public types at crate root
pub use attribute::ConceptAttribute;
pub use catalog::{PairEntry, SearchIndexEntry};
pub use code::{canonicalize_code, CODE_WIDTH};
pub use concept_id::ConceptId;
pub use concept_name::ConceptName;
pub use drug::{DrugRecord, PriceHistory};
pub use enums::{Classification, FormCategory, PairRole, RelationKind, SuppressFlag, TermType};
pub use observation::PriceObservation;
pub use relationship::ConceptRelationship;
