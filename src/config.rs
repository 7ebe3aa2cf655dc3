//! Pipeline configuration module.
//!
//! Every threshold, ceiling, and quality level the pipeline uses lives in one
//! [`PipelineConfig`] that is passed explicitly into each run. Values come
//! from two layers: stock defaults, overridden by an optional `art-crop.toml`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [guard]
//! max_pixels = 70000000            # Hard ceiling on width × height
//! oversize = "reject"              # "reject" or "downsample"
//! downsample_target_pixels = 70000000
//! decode_max_pixels = 280000000    # "downsample" still refuses above this
//! resample = "lanczos3"            # "triangle", "catmullrom", "lanczos3"
//! # max_dimension = 2000           # Fit the longer edge to this bound (shrink only)
//!
//! [detection]
//! threshold = 240                  # Luminance cutoff; darker pixels are artwork
//! order = "discovery"              # "discovery" or "reading"
//!
//! [classifier]
//! min_area = 5000.0
//! min_aspect = 0.5
//! max_aspect = 2.5
//! min_width = 100
//! min_height = 100
//!
//! [extraction]
//! label_extension = 1.2            # Crop height = floor(box height × factor)
//!
//! [output]
//! quality = 90                     # JPEG quality (1-100)
//! downsampled_quality = 75         # JPEG quality when the source was downsampled
//! preview_limit = 12               # 0 = all
//!
//! [processing]
//! max_processes = 4                # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Quality, ResampleFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "art-crop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete configuration for one pipeline run.
///
/// All fields have defaults matching the empirically tuned constants; user
/// config files need only specify the values they want to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Input guard: pixel ceiling and oversize policy.
    pub guard: GuardConfig,
    /// Foreground/background separation.
    pub detection: DetectionConfig,
    /// Heuristic accept/reject predicates.
    pub classifier: ClassifierConfig,
    /// Crop window shaping.
    pub extraction: ExtractionConfig,
    /// Encoding and preview settings.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.into()));

        if self.guard.max_pixels == 0 {
            return invalid("guard.max_pixels must be greater than 0");
        }
        if self.guard.downsample_target_pixels == 0
            || self.guard.downsample_target_pixels > self.guard.max_pixels
        {
            return invalid("guard.downsample_target_pixels must be in 1..=guard.max_pixels");
        }
        if self.guard.decode_max_pixels < self.guard.max_pixels {
            return invalid("guard.decode_max_pixels must be at least guard.max_pixels");
        }
        if self.guard.max_dimension == Some(0) {
            return invalid("guard.max_dimension must be greater than 0 when set");
        }
        if !(self.classifier.min_aspect < self.classifier.max_aspect) {
            return invalid("classifier.min_aspect must be less than classifier.max_aspect");
        }
        if self.classifier.min_area.is_nan() || self.classifier.min_area < 0.0 {
            return invalid("classifier.min_area must be non-negative");
        }
        if !(self.extraction.label_extension >= 1.0) {
            return invalid("extraction.label_extension must be at least 1.0");
        }
        for (key, q) in [
            ("output.quality", self.output.quality),
            ("output.downsampled_quality", self.output.downsampled_quality),
        ] {
            if !(1..=100).contains(&q) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        Ok(())
    }
}

/// What the input guard does with a scan above `max_pixels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Fail with `ResourceExceeded` before decoding.
    #[default]
    Reject,
    /// Decode, then shrink to `downsample_target_pixels` once.
    Downsample,
}

/// Input guard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Hard ceiling on `width × height`. A scan exactly at the ceiling passes.
    pub max_pixels: u64,
    pub oversize: OversizePolicy,
    /// Pixel budget a downsampled scan is shrunk to.
    pub downsample_target_pixels: u64,
    /// Largest scan `downsample` will decode. Above it the scan is refused
    /// under either policy.
    pub decode_max_pixels: u64,
    /// Interpolation used for any shrink the guard performs.
    pub resample: ResampleFilter,
    /// Optional bound on the longer edge; larger scans are fit inside it.
    pub max_dimension: Option<u32>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_pixels: 70_000_000,
            oversize: OversizePolicy::Reject,
            downsample_target_pixels: 70_000_000,
            decode_max_pixels: 280_000_000,
            resample: ResampleFilter::Lanczos3,
            max_dimension: None,
        }
    }
}

/// Order in which accepted regions are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionOrder {
    /// Contour discovery order of the border-following scan.
    #[default]
    Discovery,
    /// Top-to-bottom, then left-to-right by box origin.
    Reading,
}

/// Region detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionConfig {
    /// Luminance cutoff. Pixels strictly darker are foreground.
    ///
    /// Detection assumes artworks were scanned on a near-white surface; this
    /// is fixed per deployment, not tuned per image.
    pub threshold: u8,
    pub order: RegionOrder,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 240,
            order: RegionOrder::Discovery,
        }
    }
}

/// Region classifier thresholds. All comparisons are strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Minimum enclosed contour area in pixels.
    pub min_area: f64,
    pub min_aspect: f64,
    pub max_aspect: f64,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_area: 5000.0,
            min_aspect: 0.5,
            max_aspect: 2.5,
            min_width: 100,
            min_height: 100,
        }
    }
}

/// Crop window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Factor applied to a box's height so the crop reaches the label beneath it.
    pub label_extension: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            label_extension: 1.2,
        }
    }
}

/// Encoding and preview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub quality: u8,
    /// Used instead of `quality` when the guard downsampled the source.
    pub downsampled_quality: u8,
    /// Number of previews a caller shows; 0 means all.
    pub preview_limit: usize,
}

impl OutputConfig {
    /// Quality to encode crops with, given whether the guard shrank the source.
    pub fn quality_for(&self, downsampled: bool) -> Quality {
        if downsampled {
            Quality::new(self.downsampled_quality)
        } else {
            Quality::new(self.quality)
        }
    }

    /// `preview_limit` as an optional cap.
    pub fn preview_cap(&self) -> Option<usize> {
        (self.preview_limit > 0).then_some(self.preview_limit)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            downsampled_quality: 75,
            preview_limit: 12,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of scans processed at once.
    /// When absent, defaults to the number of CPU cores.
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
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `art-crop.toml` from `dir` if present, otherwise the stock defaults.
pub fn load_config(dir: &Path) -> Result<PipelineConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Load an explicit config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `art-crop.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# art-crop Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Input guard
# ---------------------------------------------------------------------------
[guard]
# Hard ceiling on width x height. A scan exactly at the ceiling is accepted.
max_pixels = 70000000

# What to do above the ceiling:
#   "reject"     - fail the file before decoding it
#   "downsample" - decode, then shrink once to downsample_target_pixels
oversize = "reject"
downsample_target_pixels = 70000000

# Largest scan "downsample" will decode before shrinking. Anything above is
# refused under either policy.
decode_max_pixels = 280000000

# Interpolation for any shrink: "triangle", "catmullrom", "lanczos3".
resample = "lanczos3"

# Fit the longer edge inside this many pixels before detection (shrink only).
# max_dimension = 2000

# ---------------------------------------------------------------------------
# Detection
# ---------------------------------------------------------------------------
[detection]
# Luminance cutoff (0-255). Pixels darker than this are treated as artwork.
# Scans must be made against a near-white surface.
threshold = 240

# Numbering of extracted artworks:
#   "discovery" - the order contours are traced in
#   "reading"   - top-to-bottom, then left-to-right
order = "discovery"

# ---------------------------------------------------------------------------
# Classifier (all comparisons are strict)
# ---------------------------------------------------------------------------
[classifier]
min_area = 5000.0
min_aspect = 0.5
max_aspect = 2.5
min_width = 100
min_height = 100

# ---------------------------------------------------------------------------
# Extraction
# ---------------------------------------------------------------------------
[extraction]
# Crop height = floor(box height x label_extension), clamped to the scan.
label_extension = 1.2

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1-100).
quality = 90
# JPEG quality used when the guard downsampled the scan.
downsampled_quality = 75
# Number of previews shown per scan (0 = all).
preview_limit = 12

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum scans processed at once.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_classifier_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.classifier.min_area, 5000.0);
        assert_eq!(config.classifier.min_aspect, 0.5);
        assert_eq!(config.classifier.max_aspect, 2.5);
        assert_eq!(config.classifier.min_width, 100);
        assert_eq!(config.classifier.min_height, 100);
    }

    #[test]
    fn default_config_has_guard_and_detection() {
        let config = PipelineConfig::default();
        assert_eq!(config.guard.max_pixels, 70_000_000);
        assert_eq!(config.guard.oversize, OversizePolicy::Reject);
        assert_eq!(config.guard.max_dimension, None);
        assert_eq!(config.guard.decode_max_pixels, 280_000_000);
        assert_eq!(config.detection.threshold, 240);
        assert_eq!(config.detection.order, RegionOrder::Discovery);
        assert_eq!(config.extraction.label_extension, 1.2);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[guard]
max_pixels = 100000000
oversize = "downsample"
"#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.guard.max_pixels, 100_000_000);
        assert_eq!(config.guard.oversize, OversizePolicy::Downsample);
        // Defaults preserved
        assert_eq!(config.guard.downsample_target_pixels, 70_000_000);
        assert_eq!(config.output.quality, 90);
    }

    #[test]
    fn parse_enum_values() {
        let toml = r#"
[guard]
resample = "catmullrom"

[detection]
order = "reading"
"#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.guard.resample, ResampleFilter::CatmullRom);
        assert_eq!(config.detection.order, RegionOrder::Reading);
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    #[test]
    fn quality_for_downsampled_source() {
        let output = OutputConfig::default();
        assert_eq!(output.quality_for(false).value(), 90);
        assert_eq!(output.quality_for(true).value(), 75);
    }

    #[test]
    fn preview_cap_zero_means_all() {
        let mut output = OutputConfig::default();
        assert_eq!(output.preview_cap(), Some(12));
        output.preview_limit = 0;
        assert_eq!(output.preview_cap(), None);
    }

    // =========================================================================
    // Processing
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
            max_processes: Some(100_000),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str("[guard]\nmax_pixels = 1\noversize = \"reject\"").unwrap();
        let overlay: toml::Value = toml::from_str("[guard]\noversize = \"downsample\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["guard"]["max_pixels"].as_integer(), Some(1));
        assert_eq!(merged["guard"]["oversize"].as_str(), Some("downsample"));
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[classifier]\nmin_width = 50\n\n[output]\nquality = 60\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.classifier.min_width, 50);
        assert_eq!(config.classifier.min_height, 100);
        assert_eq!(config.output.quality, 60);
    }

    #[test]
    fn load_config_file_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "this is not toml [[[").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = "[classifier]\nmin_widht = 50\n";
        let result: Result<PipelineConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[colors]\nbg = 1\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(Some(value)).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = PipelineConfig::default();
        config.output.quality = 100;
        assert!(config.validate().is_ok());
        config.output.quality = 0;
        assert!(config.validate().is_err());
        config.output.quality = 90;
        config.output.downsampled_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_aspect_range() {
        let mut config = PipelineConfig::default();
        config.classifier.min_aspect = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_downsample_target_within_ceiling() {
        let mut config = PipelineConfig::default();
        config.guard.downsample_target_pixels = config.guard.max_pixels + 1;
        assert!(config.validate().is_err());
        config.guard.downsample_target_pixels = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_decode_ceiling_not_below_max_pixels() {
        let mut config = PipelineConfig::default();
        config.guard.decode_max_pixels = config.guard.max_pixels - 1;
        assert!(config.validate().is_err());
        config.guard.decode_max_pixels = config.guard.max_pixels;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_label_extension_never_shrinks() {
        let mut config = PipelineConfig::default();
        config.extraction.label_extension = 0.9;
        assert!(config.validate().is_err());
        config.extraction.label_extension = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[guard]\nmax_pixels = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
