//! Per-concept aggregation of resolved price rows.

use std::collections::HashMap;

use nadac_types::{ConceptId, DrugRecord, FormCategory};
use thiserror::Error;

use crate::resolver::ResolvedRecord;
use crate::types::RrfError;

/// A failure confined to one concept group.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// The concept id cannot be used as an output file name.
    #[error("concept id {0:?} is not usable as a file name")]
    InvalidConceptId(ConceptId),

    /// Writing the record failed.
    #[error("failed to write record for concept {concept_id}: {source}")]
    Write {
        /// The concept whose record was not written.
        concept_id: ConceptId,
        /// The underlying error.
        #[source]
        source: RrfError,
    },
}

impl AggregateError {
    /// The concept the failure belongs to.
    pub fn concept_id(&self) -> &str {
        match self {
            Self::InvalidConceptId(id) => id,
            Self::Write { concept_id, .. } => concept_id,
        }
    }
}

/// Groups being built for one concept.
#[derive(Debug)]
struct Group {
    record: DrugRecord,
    /// First non-empty manufacturer among brand-classified rows.
    brand_manufacturer: Option<String>,
    /// Non-empty manufacturers with counts, in first-seen order.
    manufacturer_counts: Vec<(String, usize)>,
}

impl Group {
    fn new(first: &ResolvedRecord) -> Self {
        Self {
            record: DrugRecord::new(
                first.concept_id.clone(),
                first.display_name.clone(),
                first.is_brand,
            ),
            brand_manufacturer: None,
            manufacturer_counts: Vec::new(),
        }
    }

    fn merge(&mut self, resolved: ResolvedRecord) {
        let record = &mut self.record;
        record.insert_price(
            &resolved.external_code,
            &resolved.effective_date,
            resolved.unit_price,
        );

        fill(&mut record.display_name, resolved.display_name);
        fill(&mut record.ingredient_name, resolved.ingredient_name);
        fill(&mut record.strength, resolved.strength);
        fill(&mut record.form, resolved.form);
        if record.paired_brand_id.is_none() {
            record.paired_brand_id = resolved.paired_brand_id;
        }
        if record.paired_generic_id.is_none() {
            record.paired_generic_id = resolved.paired_generic_id;
        }

        let manufacturer = resolved.manufacturer_name;
        if manufacturer.is_empty() {
            return;
        }
        if resolved.is_brand && self.brand_manufacturer.is_none() {
            self.brand_manufacturer = Some(manufacturer.clone());
        }
        match self
            .manufacturer_counts
            .iter_mut()
            .find(|(name, _)| *name == manufacturer)
        {
            Some((_, count)) => *count += 1,
            None => self.manufacturer_counts.push((manufacturer, 1)),
        }
    }

    fn finish(self) -> DrugRecord {
        let mut record = self.record;
        record.manufacturer_name = match self.brand_manufacturer {
            Some(name) => name,
            None => most_frequent(self.manufacturer_counts),
        };
        record.form_category = FormCategory::from_form(&record.form);
        record
    }
}

fn fill(field: &mut String, value: String) {
    if field.is_empty() && !value.is_empty() {
        *field = value;
    }
}

/// Highest count wins; ties keep the first-seen name.
fn most_frequent(counts: Vec<(String, usize)>) -> String {
    let mut best: Option<(String, usize)> = None;
    for (name, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name).unwrap_or_default()
}

/// Returns true if a concept id can be used as a file stem.
pub fn is_file_safe(concept_id: &str) -> bool {
    !concept_id.is_empty()
        && !concept_id.starts_with('.')
        && concept_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Result of aggregation.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Finished records, in first-seen concept order.
    pub records: Vec<DrugRecord>,
    /// Groups that could not be built.
    pub failures: Vec<AggregateError>,
}

/// Groups resolved rows by concept and merges their prices and attributes.
///
/// Concepts keep the order in which they were first seen. Prices for the same
/// code and date are overwritten in arrival order.
#[derive(Debug, Default)]
pub struct Aggregator {
    order: Vec<ConceptId>,
    groups: HashMap<ConceptId, Group>,
}

impl Aggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one resolved row.
    pub fn add(&mut self, resolved: ResolvedRecord) {
        let order = &mut self.order;
        let group = self
            .groups
            .entry(resolved.concept_id.clone())
            .or_insert_with(|| {
                order.push(resolved.concept_id.clone());
                Group::new(&resolved)
            });
        group.merge(resolved);
    }

    /// Number of concepts seen so far.
    pub fn group_count(&self) -> usize {
        self.order.len()
    }

    /// Finishes every group. A failing group does not affect the others.
    pub fn finish(mut self) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for concept_id in self.order {
            let Some(group) = self.groups.remove(&concept_id) else {
                continue;
            };

            if !is_file_safe(&concept_id) {
                tracing::warn!("Skipping concept {:?}: not usable as a file name", concept_id);
                aggregation
                    .failures
                    .push(AggregateError::InvalidConceptId(concept_id));
                continue;
            }

            aggregation.records.push(group.finish());
        }

        aggregation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FieldSources;

    fn make_record(concept: &str, code: &str, date: &str, price: f64, is_brand: bool) -> ResolvedRecord {
        ResolvedRecord {
            concept_id: concept.to_string(),
            external_code: code.to_string(),
            display_name: format!("Drug {}", concept),
            is_brand,
            paired_brand_id: None,
            paired_generic_id: None,
            ingredient_name: String::new(),
            manufacturer_name: String::new(),
            strength: String::new(),
            form: String::new(),
            unit_price: price,
            effective_date: date.to_string(),
            sources: FieldSources::default(),
        }
    }

    fn with_manufacturer(mut record: ResolvedRecord, name: &str) -> ResolvedRecord {
        record.manufacturer_name = name.to_string();
        record
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let mut aggregator = Aggregator::new();
        aggregator.add(make_record("2", "A", "2025-01-01", 1.0, false));
        aggregator.add(make_record("1", "B", "2025-01-01", 1.0, false));
        aggregator.add(make_record("2", "C", "2025-01-01", 1.0, false));

        let aggregation = aggregator.finish();
        let ids: Vec<_> = aggregation.records.iter().map(|r| r.concept_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(aggregation.records[0].prices.len(), 2);
    }

    #[test]
    fn test_last_write_wins_for_same_code_and_date() {
        let mut aggregator = Aggregator::new();
        aggregator.add(make_record("1", "00093410001", "2025-10-01", 1.50, true));
        aggregator.add(make_record("1", "00093410001", "2025-10-01", 1.60, true));

        let record = &aggregator.finish().records[0];
        assert_eq!(record.price("00093410001", "2025-10-01"), Some(1.60));
        assert_eq!(record.observation_count(), 1);
    }

    #[test]
    fn test_fields_filled_not_overwritten() {
        let mut first = make_record("1", "A", "2025-01-01", 1.0, true);
        first.strength = "10 MG".to_string();
        let mut second = make_record("1", "A", "2025-02-01", 1.0, false);
        second.strength = "20 MG".to_string();
        second.form = "Oral Tablet".to_string();
        second.paired_generic_id = Some("9".to_string());

        let mut aggregator = Aggregator::new();
        aggregator.add(first);
        aggregator.add(second);
        let record = &aggregator.finish().records[0];

        assert!(record.is_brand);
        assert_eq!(record.strength, "10 MG");
        assert_eq!(record.form, "Oral Tablet");
        assert_eq!(record.form_category, FormCategory::OralTablet);
        assert_eq!(record.paired_generic_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_brand_manufacturer_preferred() {
        let mut aggregator = Aggregator::new();
        aggregator.add(with_manufacturer(make_record("1", "A", "d1", 1.0, false), "Generic Co"));
        aggregator.add(with_manufacturer(make_record("1", "A", "d2", 1.0, false), "Generic Co"));
        aggregator.add(with_manufacturer(make_record("1", "A", "d3", 1.0, true), "Brand Co"));

        assert_eq!(aggregator.finish().records[0].manufacturer_name, "Brand Co");
    }

    #[test]
    fn test_most_frequent_manufacturer_with_first_seen_tie() {
        let mut aggregator = Aggregator::new();
        aggregator.add(with_manufacturer(make_record("1", "A", "d1", 1.0, false), "Alpha"));
        aggregator.add(with_manufacturer(make_record("1", "A", "d2", 1.0, false), "Beta"));
        aggregator.add(make_record("1", "A", "d3", 1.0, false));
        aggregator.add(with_manufacturer(make_record("1", "A", "d4", 1.0, false), "Beta"));
        aggregator.add(with_manufacturer(make_record("2", "A", "d1", 1.0, false), "Gamma"));
        aggregator.add(with_manufacturer(make_record("2", "A", "d2", 1.0, false), "Delta"));

        let records = aggregator.finish().records;
        assert_eq!(records[0].manufacturer_name, "Beta");
        assert_eq!(records[1].manufacturer_name, "Gamma");
    }

    #[test]
    fn test_identical_duplicates_are_order_independent() {
        let rows = [
            make_record("1", "A", "d1", 1.0, false),
            make_record("1", "A", "d1", 1.0, false),
            make_record("1", "B", "d1", 2.0, false),
        ];

        let mut forward = Aggregator::new();
        rows.iter().cloned().for_each(|r| forward.add(r));
        let mut backward = Aggregator::new();
        rows.iter().rev().cloned().for_each(|r| backward.add(r));

        assert_eq!(forward.finish().records, backward.finish().records);
    }

    #[test]
    fn test_unsafe_concept_id_is_isolated() {
        let mut aggregator = Aggregator::new();
        aggregator.add(make_record("../etc", "A", "d1", 1.0, false));
        aggregator.add(make_record("7", "A", "d1", 1.0, false));

        let aggregation = aggregator.finish();
        assert_eq!(aggregation.records.len(), 1);
        assert_eq!(aggregation.failures.len(), 1);
        assert_eq!(aggregation.failures[0].concept_id(), "../etc");
    }

    #[test]
    fn test_is_file_safe() {
        assert!(is_file_safe("197316"));
        assert!(!is_file_safe(""));
        assert!(!is_file_safe("a/b"));
        assert!(!is_file_safe(".hidden"));
    }
}
