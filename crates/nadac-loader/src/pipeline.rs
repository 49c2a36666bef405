//! End-to-end run: discover, index, resolve, aggregate, emit.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use nadac_types::{FormCategory, PriceObservation};

use crate::aggregator::Aggregator;
use crate::catalog::Catalog;
use crate::emitter::Emitter;
use crate::extract::NameParser;
use crate::index::load_reference_index;
use crate::loader::{discover_input_files, DEFAULT_PRICE_FILE};
use crate::observation::PriceFileReader;
use crate::resolver::{
    DropReason, FieldSources, InvalidField, Provenance, ResolvedRecord, Resolver, ResolverConfig,
};
use crate::types::{IndexConfig, RrfError, RrfResult};

/// Mapping rates below this fraction are reported as suspicious.
pub const SUSPICIOUS_MAPPING_RATE: f64 = 0.01;

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the RRF tables and the price file.
    pub data_dir: PathBuf,
    /// Output root; records go to `<output_dir>/prices`.
    pub output_dir: PathBuf,
    /// Price file name inside `data_dir`.
    pub price_file: String,
    /// Resolver switches.
    pub resolver: ResolverConfig,
    /// Reference row selection.
    pub index: IndexConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("data"),
            price_file: DEFAULT_PRICE_FILE.to_string(),
            resolver: ResolverConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

/// Dropped price rows by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
    /// Code empty or not in the code map.
    pub unresolvable_code: usize,
    /// Price not a positive number.
    pub invalid_price: usize,
    /// Effective date blank.
    pub missing_date: usize,
    /// Rows the CSV reader could not read.
    pub malformed: usize,
}

impl DropCounts {
    /// All dropped rows.
    pub fn total(&self) -> usize {
        self.unresolvable_code + self.invalid_price + self.missing_date + self.malformed
    }

    fn record(&mut self, reason: &DropReason) {
        match reason {
            DropReason::UnresolvableCode { .. } => self.unresolvable_code += 1,
            DropReason::InvalidObservation(InvalidField::Price(_)) => self.invalid_price += 1,
            DropReason::InvalidObservation(InvalidField::MissingDate) => self.missing_date += 1,
        }
    }
}

/// How often one field came from each source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvenanceCounts {
    /// Found in the reference tables.
    pub reference: usize,
    /// Taken from the name or price row.
    pub derived: usize,
    /// Not found at all.
    pub missing: usize,
}

impl ProvenanceCounts {
    fn record(&mut self, provenance: Provenance) {
        match provenance {
            Provenance::Reference => self.reference += 1,
            Provenance::Derived => self.derived += 1,
            Provenance::Missing => self.missing += 1,
        }
    }

    /// Rows where the reference tables had no value.
    pub fn no_match(&self) -> usize {
        self.derived + self.missing
    }
}

/// Provenance counts per enriched field, over resolved rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Display name.
    pub name: ProvenanceCounts,
    /// Pairing partner.
    pub pairing: ProvenanceCounts,
    /// Ingredient.
    pub ingredient: ProvenanceCounts,
    /// Manufacturer.
    pub manufacturer: ProvenanceCounts,
    /// Strength.
    pub strength: ProvenanceCounts,
    /// Dosage form.
    pub form: ProvenanceCounts,
}

impl FieldStats {
    fn record(&mut self, sources: &FieldSources) {
        self.name.record(sources.name);
        self.pairing.record(sources.pairing);
        self.ingredient.record(sources.ingredient);
        self.manufacturer.record(sources.manufacturer);
        self.strength.record(sources.strength);
        self.form.record(sources.form);
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Price rows read.
    pub processed: usize,
    /// Rows resolved to a concept with a valid price and date.
    pub resolved: usize,
    /// Dropped rows by reason.
    pub drops: DropCounts,
    /// Distinct concepts among resolved rows.
    pub groups: usize,
    /// Record files written.
    pub created: usize,
    /// Groups that could not be built or written.
    pub failed_groups: usize,
    /// Field provenance over resolved rows.
    pub fields: FieldStats,
    /// Reference tables that were missing.
    pub degraded: Vec<&'static str>,
    /// Product codes claimed by more than one concept.
    pub code_collisions: usize,
    /// Entries in the full catalog.
    pub catalog_entries: usize,
    /// Entries in the paired-only catalog.
    pub paired_entries: usize,
    /// Entries in the pair table.
    pub comparison_entries: usize,
    /// Written records per form category.
    pub form_categories: BTreeMap<FormCategory, usize>,
    /// Wall time in milliseconds.
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Fraction of read rows whose code mapped to a concept.
    pub fn mapping_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            let mapped = self.processed - self.drops.unresolvable_code - self.drops.malformed;
            mapped as f64 / self.processed as f64
        }
    }

    /// True when rows were read but almost none mapped, which usually means
    /// mismatched input releases or a code format change.
    pub fn is_suspicious(&self) -> bool {
        self.processed > 0 && self.mapping_rate() < SUSPICIOUS_MAPPING_RATE
    }

    /// True when any reference table was missing.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    /// Logs the summary.
    pub fn log(&self) {
        tracing::info!(
            "Processed {} price rows: {} resolved, {} skipped ({} unresolvable code, {} invalid price, {} missing date, {} malformed)",
            self.processed,
            self.resolved,
            self.drops.total(),
            self.drops.unresolvable_code,
            self.drops.invalid_price,
            self.drops.missing_date,
            self.drops.malformed
        );
        tracing::info!(
            "Created {} of {} drug records ({} failed) in {} ms",
            self.created,
            self.groups,
            self.failed_groups,
            self.elapsed_ms
        );
        tracing::info!(
            "No reference match: name {}, pairing {}, ingredient {}, manufacturer {}, strength {}, form {}",
            self.fields.name.no_match(),
            self.fields.pairing.no_match(),
            self.fields.ingredient.no_match(),
            self.fields.manufacturer.no_match(),
            self.fields.strength.no_match(),
            self.fields.form.no_match()
        );
        tracing::info!(
            "Indexes: {} in full catalog, {} paired, {} in comparison map",
            self.catalog_entries,
            self.paired_entries,
            self.comparison_entries
        );
        for (category, count) in &self.form_categories {
            tracing::debug!("Form category {}: {}", category.label(), count);
        }
        if self.is_degraded() {
            tracing::warn!(
                "Degraded run: missing {}; affected fields fell back to name extraction",
                self.degraded.join(", ")
            );
        }
        if self.is_suspicious() {
            tracing::warn!(
                "Mapping rate {:.2}% is below {:.0}%; check that the RxNorm release matches the price file",
                self.mapping_rate() * 100.0,
                SUSPICIOUS_MAPPING_RATE * 100.0
            );
        }
    }
}

/// Runs the whole pipeline.
///
/// # Errors
/// Fails on a missing data directory or price file, a schema mismatch in any
/// input, or an output directory or index file that cannot be written.
/// Per-row and per-group problems are counted in the summary instead.
pub fn run(config: &PipelineConfig) -> RrfResult<RunSummary> {
    let start = Instant::now();
    let mut summary = RunSummary::default();

    tracing::info!("Discovering input files in {}", config.data_dir.display());
    let files = discover_input_files(&config.data_dir, &config.price_file)?;
    let price_path = files
        .price_file
        .clone()
        .ok_or_else(|| RrfError::RequiredFileMissing {
            file_type: config.price_file.clone(),
            directory: config.data_dir.display().to_string(),
        })?;

    let (index, index_stats) = load_reference_index(&files, &config.index)?;
    summary.degraded = index_stats.degraded;
    summary.code_collisions = index.code_collisions();

    let names = NameParser::new()?;

    tracing::info!("Reading prices from {}", price_path.display());
    let observations = read_observations(PriceFileReader::from_path(&price_path)?, &mut summary);

    let resolver = Resolver::new(&index, &names, config.resolver);
    let results = resolve_all(&resolver, &observations);

    let mut aggregator = Aggregator::new();
    for result in results {
        match result {
            Ok(resolved) => {
                summary.resolved += 1;
                summary.fields.record(&resolved.sources);
                aggregator.add(resolved);
            }
            Err(reason) => summary.drops.record(&reason),
        }
    }
    summary.groups = aggregator.group_count();
    tracing::info!(
        "Resolved {} of {} rows into {} concepts",
        summary.resolved,
        summary.processed,
        summary.groups
    );

    let aggregation = aggregator.finish();
    let emitter = Emitter::create(&config.output_dir)?;
    let (written, write_failures) = emitter.write_records(aggregation.records);
    summary.failed_groups = aggregation.failures.len() + write_failures.len();
    summary.created = written.len();
    for record in &written {
        *summary.form_categories.entry(record.form_category).or_default() += 1;
    }

    let catalog = Catalog::build(&written, &index);
    emitter.write_catalog(&catalog)?;
    summary.catalog_entries = catalog.all.len();
    summary.paired_entries = catalog.has_pair.len();
    summary.comparison_entries = catalog.comparison.len();

    summary.elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(summary)
}

fn read_observations<R: std::io::Read>(
    reader: PriceFileReader<R>,
    summary: &mut RunSummary,
) -> Vec<PriceObservation> {
    let mut observations = Vec::new();
    for result in reader {
        summary.processed += 1;
        match result {
            Ok(observation) => observations.push(observation),
            Err(_) => summary.drops.malformed += 1,
        }
    }
    observations
}

/// Resolves rows in input order.
#[cfg(feature = "parallel")]
fn resolve_all(
    resolver: &Resolver<'_>,
    observations: &[PriceObservation],
) -> Vec<Result<ResolvedRecord, DropReason>> {
    observations
        .par_iter()
        .map(|observation| resolver.resolve(observation))
        .collect()
}

/// Resolves rows in input order.
#[cfg(not(feature = "parallel"))]
fn resolve_all(
    resolver: &Resolver<'_>,
    observations: &[PriceObservation],
) -> Vec<Result<ResolvedRecord, DropReason>> {
    observations
        .iter()
        .map(|observation| resolver.resolve(observation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_rate() {
        let summary = RunSummary {
            processed: 1000,
            drops: DropCounts {
                unresolvable_code: 995,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!((summary.mapping_rate() - 0.005).abs() < 1e-9);
        assert!(summary.is_suspicious());

        let empty = RunSummary::default();
        assert_eq!(empty.mapping_rate(), 0.0);
        assert!(!empty.is_suspicious());
    }

    #[test]
    fn test_drop_counts() {
        let mut drops = DropCounts::default();
        drops.record(&DropReason::UnresolvableCode {
            code: "1".to_string(),
        });
        drops.record(&DropReason::InvalidObservation(InvalidField::MissingDate));
        drops.record(&DropReason::InvalidObservation(InvalidField::Price("0".to_string())));
        assert_eq!(drops.total(), 3);
        assert_eq!(drops.invalid_price, 1);
    }

    #[test]
    fn test_provenance_counts() {
        let mut stats = FieldStats::default();
        stats.record(&FieldSources {
            name: Provenance::Reference,
            manufacturer: Provenance::Derived,
            ..Default::default()
        });
        assert_eq!(stats.name.no_match(), 0);
        assert_eq!(stats.manufacturer.no_match(), 1);
        assert_eq!(stats.form.missing, 1);
    }

    #[test]
    fn test_missing_data_directory_is_fatal() {
        let config = PipelineConfig {
            data_dir: PathBuf::from("/nonexistent/nadac"),
            ..Default::default()
        };
        assert!(matches!(run(&config), Err(RrfError::DirectoryNotFound { .. })));
    }
}
