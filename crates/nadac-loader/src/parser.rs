//! Generic RRF file parser.
//!
//! Provides a streaming parser for RxNorm pipe-delimited RRF tables. RRF
//! files have no header row; every line ends with a trailing `|`, so a table
//! with `n` columns yields `n + 1` fields per line.

use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{RrfConfig, RrfError, RrfResult};

/// Trait for types that can be parsed from RRF rows.
///
/// Implement this trait for each RRF table the loader reads.
pub trait RrfRecord: Sized {
    /// Table name used in diagnostics, e.g. `RXNSAT`.
    const TABLE: &'static str;

    /// Column names of the table, in file order.
    const COLUMNS: &'static [&'static str];

    /// Parse a record from a CSV StringRecord.
    fn from_record(record: &StringRecord) -> RrfResult<Self>;

    /// Returns true if this record passes the given filter config.
    fn passes_filter(&self, config: &RrfConfig) -> bool;
}

/// A streaming parser for RRF files.
///
/// The first row is validated against [`RrfRecord::COLUMNS`] when the parser
/// is created; a mismatch there means the wrong file or release format and is
/// fatal. Later rows with a wrong field count are yielded as
/// [`RrfError::InvalidRow`] so callers can count and skip them.
pub struct RrfParser<R: Read, T: RrfRecord> {
    reader: Reader<R>,
    config: RrfConfig,
    pending: Option<StringRecord>,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: RrfRecord> RrfParser<BufReader<File>, T> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or its first row does
    /// not have the expected number of columns.
    pub fn from_path<P: AsRef<Path>>(path: P, config: RrfConfig) -> RrfResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RrfError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader, config).map_err(|e| match e {
            RrfError::SchemaMismatch {
                expected, found, ..
            } => RrfError::SchemaMismatch {
                file: path.display().to_string(),
                expected,
                found,
            },
            other => other,
        })
    }
}

impl<R: Read, T: RrfRecord> RrfParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, config: RrfConfig) -> RrfResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let pending = Self::read_first(&mut csv_reader)?;

        Ok(Self {
            reader: csv_reader,
            config,
            pending,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Reads and validates the first row, if any.
    fn read_first(reader: &mut Reader<R>) -> RrfResult<Option<StringRecord>> {
        let mut record = StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Ok(None);
        }

        if !Self::has_expected_width(record.len()) {
            return Err(RrfError::SchemaMismatch {
                file: T::TABLE.to_string(),
                expected: format!("{} columns ({})", T::COLUMNS.len(), T::COLUMNS.join("|")),
                found: format!("{} fields", Self::column_count(&record)),
            });
        }

        Ok(Some(record))
    }

    /// Accepts rows with or without the trailing delimiter.
    fn has_expected_width(fields: usize) -> bool {
        let expected = T::COLUMNS.len();
        fields == expected + 1 || fields == expected
    }

    fn column_count(record: &StringRecord) -> usize {
        match record.iter().last() {
            Some("") if record.len() > 1 => record.len() - 1,
            _ => record.len(),
        }
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn parse_row(&mut self, record: StringRecord) -> Option<RrfResult<T>> {
        self.records_read += 1;

        if record.iter().all(|f| f.trim().is_empty()) {
            return None;
        }

        if !Self::has_expected_width(record.len()) {
            return Some(Err(RrfError::InvalidRow {
                line: record.position().map_or(0, |p| p.line()),
                expected: T::COLUMNS.len(),
                found: Self::column_count(&record),
            }));
        }

        match T::from_record(&record) {
            Ok(parsed) if parsed.passes_filter(&self.config) => Some(Ok(parsed)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<R: Read, T: RrfRecord> Iterator for RrfParser<R, T> {
    type Item = RrfResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.pending.take() {
            if let Some(item) = self.parse_row(first) {
                return Some(item);
            }
        }

        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    if let Some(item) = self.parse_row(record) {
                        return Some(item);
                    }
                    // Blank or filtered out, continue to next
                }
                Ok(false) => return None, // End of file
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for reading RRF field values.
pub mod parse {
    use csv::StringRecord;

    /// Returns the trimmed field at `index`, or `""` when absent.
    pub fn field(record: &StringRecord, index: usize) -> &str {
        record.get(index).unwrap_or("").trim()
    }

    /// Returns the trimmed field at `index` as an owned string.
    pub fn owned(record: &StringRecord, index: usize) -> String {
        field(record, index).to_string()
    }

    /// Parses a per-unit price. Only finite, strictly positive values pass.
    pub fn positive_price(value: &str) -> Option<f64> {
        let value = value.trim().trim_start_matches('$').replace(',', "");
        value
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}
