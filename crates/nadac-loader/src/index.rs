//! Reference lookup tables built from the RxNorm tables.
//!
//! The index is built once, before any price row is resolved, and is
//! read-only afterwards.
//!
//! ```ignore
//! let files = discover_input_files("data", DEFAULT_PRICE_FILE)?;
//! let (index, stats) = load_reference_index(&files, &IndexConfig::default())?;
//!
//! if let Some(concept) = index.concept_for_code("0093-4100-01") {
//!     println!("{:?}", index.generic_for_brand(concept));
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use nadac_types::{
    canonicalize_code, ConceptAttribute, ConceptId, ConceptName, ConceptRelationship,
    RelationKind, TermType,
};

use crate::attribute::AttributeFilter;
use crate::concept_name::NameFilter;
use crate::parser::{RrfParser, RrfRecord};
use crate::relationship::RelationshipFilter;
use crate::types::{IndexConfig, InputFiles, ParseStats, RrfConfig, RrfError, RrfResult};

/// Immutable lookup tables derived from RXNSAT, RXNCONSO and RXNREL.
#[derive(Default)]
pub struct ReferenceIndex {
    /// Canonical product code to concept. Last row wins.
    code_to_concept: HashMap<String, ConceptId>,
    /// Official display name per concept, best term type first.
    official_names: HashMap<ConceptId, String>,
    /// First RxNorm term type seen per concept.
    term_types: HashMap<ConceptId, String>,
    manufacturers: HashMap<ConceptId, String>,
    strengths: HashMap<ConceptId, String>,
    forms: HashMap<ConceptId, String>,
    /// Best generic partner per brand concept.
    brand_to_generic: HashMap<ConceptId, ConceptId>,
    /// Best brand partner per generic concept.
    generic_to_brand: HashMap<ConceptId, ConceptId>,
    product_to_ingredient: HashMap<ConceptId, ConceptId>,
    /// Codes reassigned to a different concept while building.
    code_collisions: usize,
}

impl std::fmt::Debug for ReferenceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceIndex")
            .field("code_to_concept", &self.code_to_concept.len())
            .field("official_names", &self.official_names.len())
            .field("term_types", &self.term_types.len())
            .field("manufacturers", &self.manufacturers.len())
            .field("strengths", &self.strengths.len())
            .field("forms", &self.forms.len())
            .field("brand_to_generic", &self.brand_to_generic.len())
            .field("generic_to_brand", &self.generic_to_brand.len())
            .field("product_to_ingredient", &self.product_to_ingredient.len())
            .field("code_collisions", &self.code_collisions)
            .finish()
    }
}

impl ReferenceIndex {
    /// Creates an empty index. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the concept for a product code in any spelling.
    pub fn concept_for_code(&self, code: &str) -> Option<&ConceptId> {
        let key = canonicalize_code(code);
        if key.is_empty() {
            return None;
        }
        self.code_to_concept.get(&key)
    }

    /// Official RxNorm name of a concept.
    pub fn official_name(&self, concept_id: &str) -> Option<&str> {
        self.official_names.get(concept_id).map(String::as_str)
    }

    /// Term type of a concept, if it is one the pipeline knows.
    pub fn term_type(&self, concept_id: &str) -> Option<TermType> {
        self.term_types
            .get(concept_id)
            .and_then(|code| TermType::from_code(code))
    }

    /// Labeler or manufacturer attribute.
    pub fn manufacturer(&self, concept_id: &str) -> Option<&str> {
        self.manufacturers.get(concept_id).map(String::as_str)
    }

    /// Strength attribute.
    pub fn strength(&self, concept_id: &str) -> Option<&str> {
        self.strengths.get(concept_id).map(String::as_str)
    }

    /// Dose form attribute.
    pub fn form(&self, concept_id: &str) -> Option<&str> {
        self.forms.get(concept_id).map(String::as_str)
    }

    /// Generic partner of a brand concept.
    pub fn generic_for_brand(&self, concept_id: &str) -> Option<&ConceptId> {
        self.brand_to_generic.get(concept_id)
    }

    /// Brand partner of a generic concept.
    pub fn brand_for_generic(&self, concept_id: &str) -> Option<&ConceptId> {
        self.generic_to_brand.get(concept_id)
    }

    /// Active ingredient concept of a product.
    pub fn ingredient_of(&self, concept_id: &str) -> Option<&ConceptId> {
        self.product_to_ingredient.get(concept_id)
    }

    /// Number of distinct canonical codes.
    pub fn code_count(&self) -> usize {
        self.code_to_concept.len()
    }

    /// Number of concepts with an official name.
    pub fn name_count(&self) -> usize {
        self.official_names.len()
    }

    /// Number of pairing entries in both directions.
    pub fn pair_count(&self) -> usize {
        self.brand_to_generic.len() + self.generic_to_brand.len()
    }

    /// Codes whose concept was replaced by a later row.
    pub fn code_collisions(&self) -> usize {
        self.code_collisions
    }

    /// Returns true if no table has any entry.
    pub fn is_empty(&self) -> bool {
        self.code_to_concept.is_empty()
            && self.official_names.is_empty()
            && self.term_types.is_empty()
            && self.manufacturers.is_empty()
            && self.strengths.is_empty()
            && self.forms.is_empty()
            && self.brand_to_generic.is_empty()
            && self.generic_to_brand.is_empty()
            && self.product_to_ingredient.is_empty()
    }
}

/// Accumulates reference rows and ranks pairing candidates on [`build`](Self::build).
///
/// Rows must be fed in file order: first-seen and last-seen policies depend on it.
#[derive(Default)]
pub struct ReferenceIndexBuilder {
    config: IndexConfig,
    index: ReferenceIndex,
    strength_priority: HashMap<ConceptId, usize>,
    name_priority: HashMap<ConceptId, usize>,
    generic_candidates: HashMap<ConceptId, Vec<ConceptId>>,
    brand_candidates: HashMap<ConceptId, Vec<ConceptId>>,
}

impl ReferenceIndexBuilder {
    /// Creates a builder with the given row selection.
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Returns true if any table would take this attribute row.
    pub fn wants_attribute(&self, attribute: &ConceptAttribute) -> bool {
        attribute.passes_attribute_filter(&self.config.codes)
            || attribute.passes_attribute_filter(&self.config.manufacturers)
            || attribute.passes_attribute_filter(&self.config.strengths)
            || attribute.passes_attribute_filter(&self.config.dose_forms)
    }

    /// Returns true if any table would take this name row.
    pub fn wants_name(&self, name: &ConceptName) -> bool {
        name.passes_name_filter(&self.config.official_names)
            || name.passes_name_filter(&self.config.term_types)
    }

    /// Returns true if any table would take this relationship row.
    pub fn wants_relationship(&self, relationship: &ConceptRelationship) -> bool {
        relationship.passes_relationship_filter(&self.config.pairing)
            || relationship.passes_relationship_filter(&self.config.ingredients)
    }

    /// Adds one RXNSAT row.
    pub fn add_attribute(&mut self, attribute: ConceptAttribute) {
        if attribute.concept_id.is_empty() {
            return;
        }
        let value = attribute.attribute_value.trim();

        if attribute.passes_attribute_filter(&self.config.codes) {
            let key = canonicalize_code(value);
            if !key.is_empty() {
                if let Some(previous) = self
                    .index
                    .code_to_concept
                    .insert(key, attribute.concept_id.clone())
                {
                    if previous != attribute.concept_id {
                        self.index.code_collisions += 1;
                    }
                }
            }
        }

        if attribute.passes_attribute_filter(&self.config.manufacturers) {
            self.index
                .manufacturers
                .entry(attribute.concept_id.clone())
                .or_insert_with(|| value.to_string());
        }

        if attribute.passes_attribute_filter(&self.config.strengths) {
            if let Some(priority) = self.config.strengths.priority_of(&attribute.attribute_name) {
                let best = self
                    .strength_priority
                    .entry(attribute.concept_id.clone())
                    .or_insert(usize::MAX);
                if priority < *best {
                    *best = priority;
                    self.index
                        .strengths
                        .insert(attribute.concept_id.clone(), value.to_string());
                }
            }
        }

        if attribute.passes_attribute_filter(&self.config.dose_forms) {
            self.index
                .forms
                .entry(attribute.concept_id)
                .or_insert_with(|| value.to_string());
        }
    }

    /// Adds one RXNCONSO row.
    pub fn add_name(&mut self, name: ConceptName) {
        if name.concept_id.is_empty() {
            return;
        }

        if name.passes_name_filter(&self.config.term_types) && !name.term_type.is_empty() {
            self.index
                .term_types
                .entry(name.concept_id.clone())
                .or_insert_with(|| name.term_type.clone());
        }

        if name.passes_name_filter(&self.config.official_names) && !name.name.is_empty() {
            if let Some(priority) = self.config.official_names.priority_of(&name.term_type) {
                let best = self
                    .name_priority
                    .entry(name.concept_id.clone())
                    .or_insert(usize::MAX);
                if priority < *best {
                    *best = priority;
                    self.index.official_names.insert(name.concept_id, name.name);
                }
            }
        }
    }

    /// Adds one RXNREL row.
    pub fn add_relationship(&mut self, relationship: ConceptRelationship) {
        let Some(kind) = relationship.kind() else {
            return;
        };

        if relationship.passes_relationship_filter(&self.config.pairing) {
            let candidates = if kind.is_brand_side() {
                Some(&mut self.generic_candidates)
            } else if kind.is_generic_side() {
                Some(&mut self.brand_candidates)
            } else {
                None
            };
            if let Some(candidates) = candidates {
                candidates
                    .entry(relationship.concept_a.clone())
                    .or_default()
                    .push(relationship.concept_b.clone());
            }
        }

        if kind == RelationKind::HasIngredient
            && relationship.passes_relationship_filter(&self.config.ingredients)
        {
            self.index
                .product_to_ingredient
                .entry(relationship.concept_a)
                .or_insert(relationship.concept_b);
        }
    }

    /// Ranks pairing candidates and returns the finished index.
    pub fn build(self) -> ReferenceIndex {
        let mut index = self.index;
        index.brand_to_generic = rank_candidates(&index, self.generic_candidates);
        index.generic_to_brand = rank_candidates(&index, self.brand_candidates);
        index
    }
}

/// Picks the best-ranked partner per concept. Ties keep the first-seen candidate.
fn rank_candidates(
    index: &ReferenceIndex,
    candidates: HashMap<ConceptId, Vec<ConceptId>>,
) -> HashMap<ConceptId, ConceptId> {
    candidates
        .into_iter()
        .filter_map(|(concept, partners)| {
            partners
                .into_iter()
                .min_by_key(|partner| TermType::rank_of(index.term_type(partner)))
                .map(|best| (concept, best))
        })
        .collect()
}

/// Parse statistics of the reference load.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// RXNSAT parse statistics.
    pub attributes: ParseStats,
    /// RXNCONSO parse statistics.
    pub names: ParseStats,
    /// RXNREL parse statistics.
    pub relationships: ParseStats,
    /// Reference tables that were missing; their maps are empty.
    pub degraded: Vec<&'static str>,
}

impl IndexStats {
    /// Malformed rows across all tables.
    pub fn error_count(&self) -> usize {
        self.attributes.error_count + self.names.error_count + self.relationships.error_count
    }
}

type Table<T> = RrfResult<(Vec<T>, ParseStats)>;

/// Loads the reference index from discovered files.
///
/// Missing tables leave their maps empty and are listed in
/// [`IndexStats::degraded`]. A table whose first row has the wrong number of
/// columns is fatal.
pub fn load_reference_index(
    files: &InputFiles,
    config: &IndexConfig,
) -> RrfResult<(ReferenceIndex, IndexStats)> {
    let selector = ReferenceIndexBuilder::new(config.clone());

    let (attributes, names, relationships) = read_tables(files, &selector)?;

    let stats = IndexStats {
        attributes: attributes.1,
        names: names.1,
        relationships: relationships.1,
        degraded: files.missing_reference_files(),
    };

    for table in &stats.degraded {
        tracing::warn!("{} not found; running without its lookups", table);
    }

    let mut builder = selector;
    attributes.0.into_iter().for_each(|a| builder.add_attribute(a));
    names.0.into_iter().for_each(|n| builder.add_name(n));
    relationships
        .0
        .into_iter()
        .for_each(|r| builder.add_relationship(r));

    let index = builder.build();

    tracing::info!(
        "Reference index: {} codes, {} names, {} pairings ({} code collisions)",
        index.code_count(),
        index.name_count(),
        index.pair_count(),
        index.code_collisions()
    );

    Ok((index, stats))
}

#[cfg(feature = "parallel")]
fn read_tables(
    files: &InputFiles,
    selector: &ReferenceIndexBuilder,
) -> RrfResult<(
    (Vec<ConceptAttribute>, ParseStats),
    (Vec<ConceptName>, ParseStats),
    (Vec<ConceptRelationship>, ParseStats),
)> {
    let ((attributes, names), relationships): ((Table<_>, Table<_>), Table<_>) = rayon::join(
        || {
            rayon::join(
                || read_table(files.attribute_file.as_deref(), |a: &ConceptAttribute| selector.wants_attribute(a)),
                || read_table(files.name_file.as_deref(), |n: &ConceptName| selector.wants_name(n)),
            )
        },
        || read_table(files.relationship_file.as_deref(), |r: &ConceptRelationship| selector.wants_relationship(r)),
    );

    Ok((attributes?, names?, relationships?))
}

#[cfg(not(feature = "parallel"))]
fn read_tables(
    files: &InputFiles,
    selector: &ReferenceIndexBuilder,
) -> RrfResult<(
    (Vec<ConceptAttribute>, ParseStats),
    (Vec<ConceptName>, ParseStats),
    (Vec<ConceptRelationship>, ParseStats),
)> {
    Ok((
        read_table(files.attribute_file.as_deref(), |a: &ConceptAttribute| selector.wants_attribute(a))?,
        read_table(files.name_file.as_deref(), |n: &ConceptName| selector.wants_name(n))?,
        read_table(files.relationship_file.as_deref(), |r: &ConceptRelationship| selector.wants_relationship(r))?,
    ))
}

/// Reads the rows of one table that `keep` accepts. A missing path yields no rows.
fn read_table<T, F>(path: Option<&Path>, keep: F) -> Table<T>
where
    T: RrfRecord,
    F: Fn(&T) -> bool,
{
    let Some(path) = path else {
        return Ok((Vec::new(), ParseStats::default()));
    };

    let start = Instant::now();
    let mut parser = RrfParser::<_, T>::from_path(path, RrfConfig::default())?;
    let mut rows = Vec::new();
    let mut stats = ParseStats::default();

    for result in parser.by_ref() {
        match result {
            Ok(row) if keep(&row) => rows.push(row),
            Ok(_) => stats.skipped_records += 1,
            Err(RrfError::Io(e)) => return Err(RrfError::Io(e)),
            Err(_) => stats.error_count += 1,
        }
    }

    stats.total_records = parser.records_read();
    stats.filtered_records = rows.len();
    stats.parse_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Parsed {}: {} of {} rows kept in {} ms",
        T::TABLE,
        stats.filtered_records,
        stats.total_records,
        stats.parse_time_ms
    );
    if stats.error_count > 0 {
        tracing::warn!("{}: {} malformed rows skipped", T::TABLE, stats.error_count);
    }

    Ok((rows, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nadac_types::SuppressFlag;

    fn make_attribute(concept: &str, name: &str, source: &str, value: &str) -> ConceptAttribute {
        ConceptAttribute {
            concept_id: concept.to_string(),
            attribute_name: name.to_string(),
            attribute_value: value.to_string(),
            source: source.to_string(),
            suppress: SuppressFlag::NotSuppressed,
        }
    }

    fn make_name(concept: &str, term_type: &str, name: &str, suppress: SuppressFlag) -> ConceptName {
        ConceptName {
            concept_id: concept.to_string(),
            term_type: term_type.to_string(),
            name: name.to_string(),
            source: "RXNORM".to_string(),
            suppress,
        }
    }

    fn make_relationship(a: &str, relation: &str, b: &str) -> ConceptRelationship {
        ConceptRelationship {
            concept_a: a.to_string(),
            concept_b: b.to_string(),
            relation: relation.to_string(),
            source: "RXNORM".to_string(),
        }
    }

    fn builder() -> ReferenceIndexBuilder {
        ReferenceIndexBuilder::new(IndexConfig::default())
    }

    #[test]
    fn test_code_map_last_seen_wins_and_counts_collisions() {
        let mut builder = builder();
        builder.add_attribute(make_attribute("1", "NDC", "RXNORM", "0093-4100-01"));
        builder.add_attribute(make_attribute("1", "NDC", "MTHSPL", "00093410001"));
        builder.add_attribute(make_attribute("2", "NDC", "VANDF", "00093410001"));
        let index = builder.build();

        assert_eq!(index.concept_for_code("93410001").map(String::as_str), Some("2"));
        assert_eq!(index.code_count(), 1);
        assert_eq!(index.code_collisions(), 1);
        assert_eq!(index.concept_for_code(""), None);
    }

    #[test]
    fn test_manufacturer_first_seen_and_source_filter() {
        let mut builder = builder();
        builder.add_attribute(make_attribute("1", "MANU", "VANDF", "Ignored"));
        builder.add_attribute(make_attribute("1", "LBL", "MTHSPL", "Acme"));
        builder.add_attribute(make_attribute("1", "MANU", "RXNORM", "Later"));
        let index = builder.build();
        assert_eq!(index.manufacturer("1"), Some("Acme"));
    }

    #[test]
    fn test_strength_prefers_strength_attribute() {
        let mut builder = builder();
        builder.add_attribute(make_attribute("1", "SCD_STRING", "RXNORM", "500 MG (as x)"));
        builder.add_attribute(make_attribute("1", "STRENGTH", "RXNORM", "500 MG"));
        builder.add_attribute(make_attribute("1", "STRENGTH", "RXNORM", "250 MG"));
        builder.add_attribute(make_attribute("2", "SCD_STRING", "RXNORM", "10 MG"));
        builder.add_attribute(make_attribute("3", "DF", "RXNORM", "Oral Tablet"));
        let index = builder.build();

        assert_eq!(index.strength("1"), Some("500 MG"));
        assert_eq!(index.strength("2"), Some("10 MG"));
        assert_eq!(index.form("3"), Some("Oral Tablet"));
        assert_eq!(index.form("1"), None);
    }

    #[test]
    fn test_official_names_skip_suppressed_and_other_term_types() {
        let mut builder = builder();
        builder.add_name(make_name("1", "SY", "Synonym", SuppressFlag::NotSuppressed));
        builder.add_name(make_name("1", "SCD", "Obsolete", SuppressFlag::Obsolete));
        builder.add_name(make_name("1", "SCD", "Official", SuppressFlag::NotSuppressed));
        builder.add_name(make_name("1", "SBD", "Second", SuppressFlag::NotSuppressed));
        let index = builder.build();

        assert_eq!(index.official_name("1"), Some("Official"));
        assert_eq!(index.term_type("1"), None); // first row was SY
        assert_eq!(index.name_count(), 1);
    }

    #[test]
    fn test_official_name_follows_term_type_priority() {
        let rows = [
            make_name("1", "IN", "acetaminophen", SuppressFlag::NotSuppressed),
            make_name("1", "SCD", "Acetaminophen 500 MG Oral Tablet", SuppressFlag::NotSuppressed),
            make_name("1", "SCD", "Later SCD", SuppressFlag::NotSuppressed),
        ];

        let mut forward = builder();
        rows.iter().cloned().for_each(|n| forward.add_name(n));
        let mut backward = builder();
        backward.add_name(rows[1].clone());
        backward.add_name(rows[0].clone());
        backward.add_name(rows[2].clone());

        let forward = forward.build();
        let backward = backward.build();
        assert_eq!(forward.official_name("1"), Some("Acetaminophen 500 MG Oral Tablet"));
        assert_eq!(backward.official_name("1"), forward.official_name("1"));
    }

    #[test]
    fn test_pairing_prefers_best_ranked_partner() {
        let mut builder = builder();
        builder.add_name(make_name("20", "IN", "Ingredient", SuppressFlag::NotSuppressed));
        builder.add_name(make_name("21", "SCD", "Clinical", SuppressFlag::NotSuppressed));
        builder.add_name(make_name("22", "SCD", "Clinical too", SuppressFlag::NotSuppressed));
        builder.add_relationship(make_relationship("10", "tradename_of", "20"));
        builder.add_relationship(make_relationship("10", "tradename_of", "21"));
        builder.add_relationship(make_relationship("10", "tradename_of", "22"));
        let index = builder.build();

        assert_eq!(index.generic_for_brand("10").map(String::as_str), Some("21"));
        assert_eq!(index.brand_for_generic("10"), None);
    }

    #[test]
    fn test_pairing_direction_by_relation() {
        let mut builder = builder();
        builder.add_relationship(make_relationship("197316", "brand_name_of", "197317"));
        builder.add_relationship(make_relationship("197317", "has_brand_name", "197316"));
        builder.add_relationship(make_relationship("5", "inverse_isa", "6"));
        let index = builder.build();

        assert_eq!(index.generic_for_brand("197316").map(String::as_str), Some("197317"));
        assert_eq!(index.brand_for_generic("197317").map(String::as_str), Some("197316"));
        assert_eq!(index.pair_count(), 2);
    }

    #[test]
    fn test_non_rxnorm_relationships_ignored() {
        let mut builder = builder();
        let mut relationship = make_relationship("1", "tradename_of", "2");
        relationship.source = "MTHSPL".to_string();
        builder.add_relationship(relationship);
        builder.add_relationship(make_relationship("3", "has_ingredient", "4"));
        builder.add_relationship(make_relationship("3", "has_ingredient", "5"));
        let index = builder.build();

        assert_eq!(index.generic_for_brand("1"), None);
        assert_eq!(index.ingredient_of("3").map(String::as_str), Some("4"));
    }

    #[test]
    fn test_load_without_reference_files_is_degraded() {
        let files = InputFiles::new();
        let (index, stats) = load_reference_index(&files, &IndexConfig::default()).unwrap();
        assert!(index.is_empty());
        assert_eq!(stats.degraded, vec!["RXNSAT", "RXNCONSO", "RXNREL"]);
    }

    #[test]
    fn test_load_reads_and_filters_tables() {
        let dir = tempfile::tempdir().unwrap();
        let sat = dir.path().join("RXNSAT.RRF");
        std::fs::write(
            &sat,
            "197316||||||||NDC|RXNORM|00093410001|N||\n\
             197316||||||||MANU|RXNORM|Acme|N||\n\
             197316||||||||ZZZ|RXNORM|noise|N||\n\
             broken|row\n",
        )
        .unwrap();

        let files = InputFiles {
            attribute_file: Some(sat),
            ..Default::default()
        };
        let (index, stats) = load_reference_index(&files, &IndexConfig::default()).unwrap();

        assert_eq!(index.concept_for_code("0093-4100-01").map(String::as_str), Some("197316"));
        assert_eq!(index.manufacturer("197316"), Some("Acme"));
        assert_eq!(stats.attributes.filtered_records, 2);
        assert_eq!(stats.attributes.skipped_records, 1);
        assert_eq!(stats.attributes.error_count, 1);
        assert_eq!(stats.degraded, vec!["RXNCONSO", "RXNREL"]);
    }

    #[test]
    fn test_load_rejects_wrong_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let rel = dir.path().join("RXNREL.RRF");
        std::fs::write(&rel, "1|2|3|\n").unwrap();

        let files = InputFiles {
            relationship_file: Some(rel),
            ..Default::default()
        };
        let result = load_reference_index(&files, &IndexConfig::default());
        assert!(matches!(result, Err(RrfError::SchemaMismatch { .. })));
    }
}
