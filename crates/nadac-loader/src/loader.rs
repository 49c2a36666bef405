//! Input file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{InputFiles, RrfError, RrfResult};

/// Default name of the NADAC price file.
pub const DEFAULT_PRICE_FILE: &str = "nadac-comparison.csv";

/// Discovers the RxNorm tables and the NADAC price file in a data directory.
///
/// RRF tables are looked up in `dir` and then in `dir/rrf`, the layout of an
/// unpacked RxNorm full release. The price file is `price_file_name` in `dir`;
/// when absent, the last `nadac*.csv` in name order is taken, which picks the
/// newest of several dated downloads.
///
/// Missing RRF tables are not an error here: the pipeline runs degraded
/// without them. A missing price file is.
pub fn discover_input_files<P: AsRef<Path>>(dir: P, price_file_name: &str) -> RrfResult<InputFiles> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(RrfError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut files = InputFiles::new();
    files.attribute_file = find_table(dir, "RXNSAT.RRF");
    files.name_file = find_table(dir, "RXNCONSO.RRF");
    files.relationship_file = find_table(dir, "RXNREL.RRF");
    files.price_file = find_price_file(dir, price_file_name)?;

    if !files.has_required_files() {
        return Err(RrfError::RequiredFileMissing {
            file_type: format!("NADAC price file ({})", price_file_name),
            directory: dir.display().to_string(),
        });
    }

    Ok(files)
}

/// Finds an RRF table in the directory or its `rrf/` subdirectory.
fn find_table(dir: &Path, file_name: &str) -> Option<PathBuf> {
    [dir.join(file_name), dir.join("rrf").join(file_name)]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

fn find_price_file(dir: &Path, price_file_name: &str) -> RrfResult<Option<PathBuf>> {
    let configured = dir.join(price_file_name);
    if configured.is_file() {
        return Ok(Some(configured));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy().to_lowercase();

        if filename_str.starts_with("nadac") && filename_str.ends_with(".csv") && entry.path().is_file() {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    Ok(candidates.pop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_discovers_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("RXNSAT.RRF"));
        touch(&dir.path().join("RXNCONSO.RRF"));
        touch(&dir.path().join("RXNREL.RRF"));
        touch(&dir.path().join(DEFAULT_PRICE_FILE));

        let files = discover_input_files(dir.path(), DEFAULT_PRICE_FILE).unwrap();
        assert!(files.missing_reference_files().is_empty());
        assert_eq!(files.price_file, Some(dir.path().join(DEFAULT_PRICE_FILE)));
    }

    #[test]
    fn test_discovers_rrf_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("rrf")).unwrap();
        touch(&dir.path().join("rrf").join("RXNSAT.RRF"));
        touch(&dir.path().join(DEFAULT_PRICE_FILE));

        let files = discover_input_files(dir.path(), DEFAULT_PRICE_FILE).unwrap();
        assert_eq!(
            files.attribute_file,
            Some(dir.path().join("rrf").join("RXNSAT.RRF"))
        );
        assert_eq!(files.missing_reference_files(), vec!["RXNCONSO", "RXNREL"]);
    }

    #[test]
    fn test_falls_back_to_newest_dated_price_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("nadac-2025-09.csv"));
        touch(&dir.path().join("nadac-2025-10.csv"));
        touch(&dir.path().join("other.csv"));

        let files = discover_input_files(dir.path(), DEFAULT_PRICE_FILE).unwrap();
        assert_eq!(files.price_file, Some(dir.path().join("nadac-2025-10.csv")));
    }

    #[test]
    fn test_missing_price_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("RXNSAT.RRF"));

        let result = discover_input_files(dir.path(), DEFAULT_PRICE_FILE);
        assert!(matches!(result, Err(RrfError::RequiredFileMissing { .. })));
    }

    #[test]
    fn test_missing_directory_is_error() {
        let result = discover_input_files("/nonexistent/nadac/data", DEFAULT_PRICE_FILE);
        assert!(matches!(result, Err(RrfError::DirectoryNotFound { .. })));
    }
}
