//! Environment configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `NADAC_DATA_DIR` | `.` |
//! | `NADAC_OUTPUT_DIR` | `data` |
//! | `NADAC_PRICE_FILE` | `nadac-comparison.csv` |
//! | `NADAC_RECIPROCAL_FALLBACK` | on; `0` or `false` turns it off |

use std::path::PathBuf;

use nadac_loader::PipelineConfig;

/// Input directory.
pub const DATA_DIR_VAR: &str = "NADAC_DATA_DIR";
/// Output root.
pub const OUTPUT_DIR_VAR: &str = "NADAC_OUTPUT_DIR";
/// Price file name inside the input directory.
pub const PRICE_FILE_VAR: &str = "NADAC_PRICE_FILE";
/// Reciprocal pairing switch.
pub const RECIPROCAL_FALLBACK_VAR: &str = "NADAC_RECIPROCAL_FALLBACK";

/// Builds the pipeline configuration from the process environment.
pub fn from_env() -> PipelineConfig {
    from_vars(|name| std::env::var(name).ok())
}

/// Builds the pipeline configuration from a variable lookup.
///
/// Unset or blank variables keep their defaults.
pub fn from_vars<F>(lookup: F) -> PipelineConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    let mut config = PipelineConfig::default();

    if let Some(dir) = get(DATA_DIR_VAR) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(dir) = get(OUTPUT_DIR_VAR) {
        config.output_dir = PathBuf::from(dir);
    }
    if let Some(file) = get(PRICE_FILE_VAR) {
        config.price_file = file.trim().to_string();
    }
    if let Some(flag) = get(RECIPROCAL_FALLBACK_VAR) {
        config.resolver.reciprocal_fallback = parse_flag(&flag);
    }

    config
}

/// Anything except `0`, `false`, `no` and `off` counts as enabled.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
