//! NADAC price file reader.
//!
//! The NADAC comparison export is a comma-separated file with a header row.
//! Column names have drifted between releases, so each logical column has a
//! list of accepted spellings, tried in order.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use nadac_types::{Classification, PriceObservation};

use crate::parser::parse;
use crate::types::{RrfError, RrfResult};

/// Accepted spellings of the product code column.
const CODE_COLUMNS: &[&str] = &["NDC"];
/// Accepted spellings of the description column.
const NAME_COLUMNS: &[&str] = &["NDC Description"];
/// Accepted spellings of the per-unit price column, most current first.
const PRICE_COLUMNS: &[&str] = &[
    "New NADAC Per Unit",
    "Old NADAC Per Unit",
    "NADAC Per Unit",
    "NADAC_Per_Unit",
];
/// Accepted spellings of the effective date column.
const DATE_COLUMNS: &[&str] = &["Effective Date", "Effective_Date"];
/// Accepted spellings of the classification column.
const CLASSIFICATION_COLUMNS: &[&str] = &[
    "Classification for Rate Setting",
    "Classification_for_Rate_Setting",
    "Classification",
];

/// Column positions resolved from a price file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFileSchema {
    code: usize,
    name: usize,
    price: usize,
    fallback_price: Option<usize>,
    date: usize,
    classification: usize,
}

impl PriceFileSchema {
    /// Resolves column positions from the header row.
    ///
    /// # Errors
    /// Returns [`RrfError::SchemaMismatch`] naming every expected column when
    /// any logical column has no accepted spelling in the header.
    pub fn from_headers(headers: &StringRecord, file: &str) -> RrfResult<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();

        let find_all = |candidates: &[&str]| -> Vec<usize> {
            candidates
                .iter()
                .filter_map(|c| names.iter().position(|n| n == c))
                .collect()
        };

        let code = find_all(CODE_COLUMNS);
        let name = find_all(NAME_COLUMNS);
        let prices = find_all(PRICE_COLUMNS);
        let date = find_all(DATE_COLUMNS);
        let classification = find_all(CLASSIFICATION_COLUMNS);

        match (
            code.first(),
            name.first(),
            prices.first(),
            date.first(),
            classification.first(),
        ) {
            (Some(&code), Some(&name), Some(&price), Some(&date), Some(&classification)) => {
                Ok(Self {
                    code,
                    name,
                    price,
                    fallback_price: prices.get(1).copied(),
                    date,
                    classification,
                })
            }
            _ => Err(RrfError::SchemaMismatch {
                file: file.to_string(),
                expected: Self::expected_description(),
                found: names.join(", "),
            }),
        }
    }

    fn expected_description() -> String {
        [
            CODE_COLUMNS,
            NAME_COLUMNS,
            PRICE_COLUMNS,
            DATE_COLUMNS,
            CLASSIFICATION_COLUMNS,
        ]
        .iter()
        .map(|spellings| spellings.join(" | "))
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Builds an observation from one data row.
    pub fn observation(&self, record: &StringRecord) -> PriceObservation {
        PriceObservation {
            external_code: parse::owned(record, self.code),
            raw_name: parse::owned(record, self.name),
            unit_price: self.choose_price(record),
            effective_date: parse::owned(record, self.date),
            classification: Classification::from_flag(parse::field(record, self.classification)),
        }
    }

    /// Takes the primary price unless it is unusable and a fallback column exists.
    fn choose_price(&self, record: &StringRecord) -> String {
        let primary = parse::field(record, self.price);
        if parse::positive_price(primary).is_some() {
            return primary.to_string();
        }
        match self.fallback_price {
            Some(index) if parse::positive_price(parse::field(record, index)).is_some() => {
                parse::owned(record, index)
            }
            _ => primary.to_string(),
        }
    }
}

/// Streaming reader over a NADAC price file.
pub struct PriceFileReader<R: Read> {
    reader: Reader<R>,
    schema: PriceFileSchema,
    records_read: usize,
}

impl PriceFileReader<BufReader<File>> {
    /// Opens a price file and validates its header.
    pub fn from_path<P: AsRef<Path>>(path: P) -> RrfResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RrfError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }
}

impl<R: Read> PriceFileReader<R> {
    /// Creates a reader and validates the header row.
    pub fn from_reader(reader: R, file: &str) -> RrfResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let schema = PriceFileSchema::from_headers(csv_reader.headers()?, file)?;

        Ok(Self {
            reader: csv_reader,
            schema,
            records_read: 0,
        })
    }

    /// Returns the resolved column layout.
    pub fn schema(&self) -> &PriceFileSchema {
        &self.schema
    }

    /// Returns the number of data rows read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: Read> Iterator for PriceFileReader<R> {
    type Item = RrfResult<PriceObservation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }
                    return Some(Ok(self.schema.observation(&record)));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "NDC Description,NDC,Old NADAC Per Unit,New NADAC Per Unit,Classification for Rate Setting,Effective Date\n";

    fn read(data: &str) -> Vec<PriceObservation> {
        PriceFileReader::from_reader(data.as_bytes(), "test.csv")
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn test_reads_comparison_layout() {
        let data = format!("{HEADER}AMOXICILLIN 500 MG CAPSULE,00093410001,0.10,0.12,G,2025-10-01\n");
        let rows = read(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].external_code, "00093410001");
        assert_eq!(rows[0].raw_name, "AMOXICILLIN 500 MG CAPSULE");
        assert_eq!(rows[0].unit_price, "0.12");
        assert_eq!(rows[0].effective_date, "2025-10-01");
        assert_eq!(rows[0].classification, Classification::Generic);
    }

    #[test]
    fn test_blank_new_price_falls_back_to_old() {
        let data = format!("{HEADER}DRUG,1,0.50,,B,2025-10-01\n");
        let rows = read(&data);
        assert_eq!(rows[0].unit_price, "0.50");
        assert!(rows[0].is_brand());
    }

    #[test]
    fn test_unusable_new_price_falls_back_to_old() {
        let data = format!("{HEADER}DRUG,1,0.50,0,B,2025-10-01\nDRUG,2,0.40,n/a,G,2025-10-01\n");
        let rows = read(&data);
        assert_eq!(rows[0].unit_price, "0.50");
        assert_eq!(rows[1].unit_price, "0.40");
    }

    #[test]
    fn test_both_prices_blank_keeps_primary() {
        let data = format!("{HEADER}DRUG,1,,,B,2025-10-01\n");
        assert_eq!(read(&data)[0].unit_price, "");
    }

    #[test]
    fn test_alternate_spellings() {
        let data = "\u{feff}NDC,NDC Description,NADAC_Per_Unit,Effective_Date,Classification\n1,X,2.5,2025-01-01,B\n";
        let rows = read(data);
        assert_eq!(rows[0].unit_price, "2.5");
        assert_eq!(rows[0].effective_date, "2025-01-01");
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let data = "NDC,NDC Description,Effective Date\n1,X,2025-01-01\n";
        match PriceFileReader::from_reader(data.as_bytes(), "prices.csv") {
            Err(RrfError::SchemaMismatch { file, expected, found }) => {
                assert_eq!(file, "prices.csv");
                assert!(expected.contains("New NADAC Per Unit"));
                assert_eq!(found, "NDC, NDC Description, Effective Date");
            }
            _ => panic!("expected schema mismatch"),
        }
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let data = format!("{HEADER},,,,,\nDRUG,1,0.5,0.6,G,2025-10-01\n");
        assert_eq!(read(&data).len(), 1);
    }
}
