//! JSON output writer.
//!
//! Layout under the output root:
//!
//! ```text
//! prices/<concept id>.json
//! search_index_all.json
//! search_index_has_pair.json
//! comparison_map.json
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nadac_types::DrugRecord;
use serde::Serialize;

use crate::aggregator::AggregateError;
use crate::catalog::Catalog;
use crate::types::RrfResult;

/// Directory holding one JSON file per concept.
pub const PRICES_DIR: &str = "prices";
/// Full catalog file name.
pub const SEARCH_INDEX_ALL: &str = "search_index_all.json";
/// Paired-only catalog file name.
pub const SEARCH_INDEX_HAS_PAIR: &str = "search_index_has_pair.json";
/// Pair table file name.
pub const COMPARISON_MAP: &str = "comparison_map.json";

/// Writes records and indexes below an output root.
#[derive(Debug, Clone)]
pub struct Emitter {
    root: PathBuf,
}

impl Emitter {
    /// Creates the output directories.
    pub fn create<P: AsRef<Path>>(root: P) -> RrfResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(PRICES_DIR))?;
        Ok(Self { root })
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a concept's record file.
    pub fn record_path(&self, concept_id: &str) -> PathBuf {
        self.root.join(PRICES_DIR).join(format!("{}.json", concept_id))
    }

    /// Writes one record file.
    pub fn write_record(&self, record: &DrugRecord) -> Result<(), AggregateError> {
        write_json(&self.record_path(&record.concept_id), record).map_err(|source| {
            AggregateError::Write {
                concept_id: record.concept_id.clone(),
                source,
            }
        })
    }

    /// Writes every record, isolating failures.
    ///
    /// Returns the records that were written and the failures.
    pub fn write_records(&self, records: Vec<DrugRecord>) -> (Vec<DrugRecord>, Vec<AggregateError>) {
        let mut written = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        for record in records {
            match self.write_record(&record) {
                Ok(()) => written.push(record),
                Err(e) => {
                    tracing::warn!("{}", e);
                    failures.push(e);
                }
            }
        }

        (written, failures)
    }

    /// Writes the three index files.
    pub fn write_catalog(&self, catalog: &Catalog) -> RrfResult<()> {
        write_json(&self.root.join(SEARCH_INDEX_ALL), &catalog.all)?;
        write_json(&self.root.join(SEARCH_INDEX_HAS_PAIR), &catalog.has_pair)?;
        write_json(&self.root.join(COMPARISON_MAP), &catalog.comparison)?;
        Ok(())
    }
}

/// Serializes `value` as indented JSON.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RrfResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
