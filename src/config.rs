//! Normalizer configuration module.
//!
//! Handles loading, validating, and merging `normalizer.toml`. Stock defaults
//! are the base layer; a user file is merged on top, and CLI flags are applied
//! last by the binary.
//!
//! ## Config File Location
//!
//! `normalizer.toml` is looked up in the current directory. `--config PATH`
//! points at any other file, which then must exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tolerance]
//! ratio = 0.05              # Max |w/h - ratio| for a catalog entry to match
//! pixels = 100              # Max per-axis pixel change when choosing scale vs crop
//!
//! [catalog]
//! ratios = [[1, 1], [4, 3], [3, 2], [16, 9], [21, 9], [9, 16]]
//!
//! [output]
//! copy_unchanged = false    # Copy untouched images into the destination tree
//!
//! [log]
//! file_stem = "image_process_log"
//! format = "csv"            # "csv" or "json"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [tolerance]
//! ratio = 0.01
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{AspectRatio, COMMON_RATIOS, Tolerance};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "normalizer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Normalizer configuration loaded from `normalizer.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Ratio and pixel tolerances.
    pub tolerance: Tolerance,
    /// Candidate aspect ratios.
    pub catalog: CatalogConfig,
    /// What lands in the destination tree.
    pub output: OutputConfig,
    /// Processing log file settings.
    pub log: LogConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl NormalizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.ratio.is_finite() || self.tolerance.ratio < 0.0 {
            return Err(ConfigError::Validation(
                "tolerance.ratio must be a finite number >= 0".into(),
            ));
        }
        if self.catalog.ratios.is_empty() {
            return Err(ConfigError::Validation(
                "catalog.ratios must not be empty".into(),
            ));
        }
        if self.catalog.ratios.iter().any(|r| r.width == 0 || r.height == 0) {
            return Err(ConfigError::Validation(
                "catalog.ratios values must be non-zero".into(),
            ));
        }
        if self.log.file_stem.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log.file_stem must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Candidate aspect ratios, in tie-break order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Ratios as `[width, height]` pairs.
    pub ratios: Vec<AspectRatio>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            ratios: COMMON_RATIOS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Copy images that need no change into the destination tree verbatim.
    pub copy_unchanged: bool,
}

/// Processing log file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// File name without extension; the extension follows `format`.
    pub file_stem: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_stem: "image_process_log".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// `<file_stem>.<csv|json>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.format.extension())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Csv,
    Json,
}

impl LogFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Csv => "csv",
            LogFormat::Json => "json",
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(NormalizerConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when the file is absent.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto `base`, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<NormalizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: NormalizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// With an explicit path the file must exist. Without one,
/// `normalizer.toml` in the current directory is used if present, and the
/// stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<NormalizerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(CONFIG_FILE_NAME))?,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `normalizer.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# img-normalizer Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from ./normalizer.toml, or from the path given with
# --config. Command-line flags override values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Tolerances
# ---------------------------------------------------------------------------
[tolerance]
# Maximum distance between an image's width/height ratio and a catalog
# ratio for that entry to be considered. 0.05 lets 1280x853 (1.5006)
# match 3:2 (1.5) but not 16:9 (1.777).
ratio = 0.05

# Maximum number of pixels an axis may lose before scaling is ruled out.
# If both axes change by at most this much the image is scaled, otherwise
# it is center-cropped.
pixels = 100

# ---------------------------------------------------------------------------
# Aspect ratio catalog
# ---------------------------------------------------------------------------
[catalog]
# Candidate ratios as [width, height]. When two candidates are equally
# close, the one listed first wins.
ratios = [[1, 1], [4, 3], [3, 2], [16, 9], [21, 9], [9, 16]]

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Adjusted images are written as <name>_<W>x<H>.<ext>, mirroring the
# source tree. Set this to also copy images that needed no change.
copy_unchanged = false

# ---------------------------------------------------------------------------
# Processing log
# ---------------------------------------------------------------------------
[log]
# Written to the destination root as <file_stem>.csv or <file_stem>.json.
file_stem = "image_process_log"
format = "csv"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers. Omit to use all CPU cores.
# Values above the core count are clamped down.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = NormalizerConfig::default();
        assert_eq!(config.tolerance.ratio, 0.05);
        assert_eq!(config.tolerance.pixels, 100);
        assert_eq!(config.catalog.ratios, COMMON_RATIOS.to_vec());
        assert!(!config.output.copy_unchanged);
        assert_eq!(config.log.file_name(), "image_process_log.csv");
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[tolerance]
ratio = 0.01
"#;
        let config: NormalizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.tolerance.ratio, 0.01);
        assert_eq!(config.tolerance.pixels, 100);
        assert_eq!(config.catalog.ratios.len(), 6);
    }

    #[test]
    fn parse_catalog_override() {
        let toml = r#"
[catalog]
ratios = [[2, 3], [5, 4]]
"#;
        let config: NormalizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.catalog.ratios,
            vec![AspectRatio::new(2, 3), AspectRatio::new(5, 4)]
        );
    }

    #[test]
    fn parse_log_format_json() {
        let toml = r#"
[log]
format = "json"
"#;
        let config: NormalizerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.file_name(), "image_process_log.json");
    }

    #[test]
    fn parse_log_format_unknown_rejected() {
        let toml = r#"
[log]
format = "xml"
"#;
        let result: Result<NormalizerConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // =========================================================================
    // effective_threads tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"pixels = 100"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"pixels = 20"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("pixels").unwrap().as_integer(), Some(20));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[tolerance]
ratio = 0.05
pixels = 100
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[tolerance]
pixels = 10
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let tol = merged.get("tolerance").unwrap();
        assert_eq!(tol.get("ratio").unwrap().as_float(), Some(0.05));
        assert_eq!(tol.get("pixels").unwrap().as_integer(), Some(10));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[catalog]
ratios = [[1, 1]]
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let ratios = merged["catalog"]["ratios"].as_array().unwrap();
        assert_eq!(ratios.len(), 1);
    }

    // =========================================================================
    // Unknown keys
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[tolerance]
pixel = 10
"#;
        let result: Result<NormalizerConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[tolerances]
ratio = 0.1
"#;
        let result: Result<NormalizerConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(NormalizerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_negative_ratio_tolerance() {
        let mut config = NormalizerConfig::default();
        config.tolerance.ratio = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_nan_ratio_tolerance() {
        let mut config = NormalizerConfig::default();
        config.tolerance.ratio = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_ratio_tolerance_ok() {
        let mut config = NormalizerConfig::default();
        config.tolerance.ratio = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_empty_catalog() {
        let mut config = NormalizerConfig::default();
        config.catalog.ratios.clear();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("catalog.ratios"));
    }

    #[test]
    fn validate_zero_ratio_component() {
        let mut config = NormalizerConfig::default();
        config.catalog.ratios.push(AspectRatio::new(0, 9));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_blank_file_stem() {
        let mut config = NormalizerConfig::default();
        config.log.file_stem = "  ".into();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_raw_config(&tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn load_config_reads_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[tolerance]
pixels = 12

[output]
copy_unchanged = true
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.tolerance.pixels, 12);
        assert_eq!(config.tolerance.ratio, 0.05);
        assert!(config.output.copy_unchanged);
    }

    #[test]
    fn load_config_missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "this is not [valid toml").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("zero.toml");
        fs::write(
            &path,
            r#"
[catalog]
ratios = [[16, 0]]
"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, NormalizerConfig::default());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let _: toml::Value =
            toml::from_str(stock_config_toml()).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: NormalizerConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, NormalizerConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[tolerance]", "[catalog]", "[output]", "[log]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["tolerance", "catalog", "output", "log", "processing"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
