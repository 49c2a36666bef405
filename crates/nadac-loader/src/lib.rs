//! # nadac-loader
//!
//! Joins NADAC drug prices against RxNorm and writes per-drug JSON records.
//!
//! Stages:
//!
//! 1. [`load_reference_index`] parses RXNSAT, RXNCONSO and RXNREL into a
//!    read-only [`ReferenceIndex`].
//! 2. [`Resolver`] binds each NADAC row to a concept and fills in pairing,
//!    name, ingredient, manufacturer, strength and form, or drops it with a
//!    [`DropReason`].
//! 3. [`Aggregator`] merges rows per concept; [`Catalog`] derives the search
//!    indexes; [`Emitter`] writes everything as JSON.
//!
//! [`run`] wires the stages together.
//!
//! ## Features
//!
//! - `parallel` (default): parses the three RRF tables concurrently and
//!   resolves price rows with rayon. Output order does not change.
//!
//! ## Usage
//!
//! ```ignore
//! use nadac_loader::{run, PipelineConfig};
//!
//! let summary = run(&PipelineConfig::default())?;
//! summary.log();
//! ```

#![warn(missing_docs)]

mod aggregator;
mod attribute;
mod catalog;
mod concept_name;
mod emitter;
mod extract;
mod index;
mod loader;
mod observation;
pub mod parser;
mod pipeline;
mod relationship;
mod resolver;
mod types;

pub use aggregator::{is_file_safe, AggregateError, Aggregation, Aggregator};
pub use attribute::AttributeFilter;
pub use catalog::Catalog;
pub use concept_name::NameFilter;
pub use emitter::{Emitter, COMPARISON_MAP, PRICES_DIR, SEARCH_INDEX_ALL, SEARCH_INDEX_HAS_PAIR};
pub use extract::{title_case, NameParser};
pub use index::{load_reference_index, IndexStats, ReferenceIndex, ReferenceIndexBuilder};
pub use loader::{discover_input_files, DEFAULT_PRICE_FILE};
pub use observation::{PriceFileReader, PriceFileSchema};
pub use parser::{RrfParser, RrfRecord};
pub use pipeline::{
    run, DropCounts, FieldStats, PipelineConfig, ProvenanceCounts, RunSummary,
    SUSPICIOUS_MAPPING_RATE,
};
pub use relationship::RelationshipFilter;
pub use resolver::{
    DropReason, FieldSources, InvalidField, Provenance, ResolvedRecord, Resolver, ResolverConfig,
};
pub use types::{
    AttributeConfig, IndexConfig, InputFiles, NameConfig, ParseStats, RelationshipConfig,
    RrfConfig, RrfError, RrfResult,
};

// Re-export nadac-types for convenience
pub use nadac_types;
