//! Poster job configuration.
//!
//! A job file describes one poster: the base image, the logo(s) placed on it,
//! and the exports to produce. Values are layered: stock defaults are
//! overridden by the user's job file, so a job only needs the keys it cares
//! about.
//!
//! ## Job File
//!
//! ```toml
//! base = "poster.png"          # Base image, relative to the job file
//! tag = "acme"                 # Used in output filenames
//! preview_width = 960          # Canvas width pixel values were chosen on
//! max_input_bytes = 26214400   # Reject inputs larger than this
//!
//! [region]                     # Logo container, fractions of the canvas
//! top = 0.62
//! bottom = 0.76
//! h_padding = 0.35
//!
//! [plate]                      # White plate behind the logo(s)
//! enabled = true
//!
//! [[logos]]
//! path = "logo.svg"
//!
//! [logos.transform]
//! zoom_percent = 90.0
//! blend_mode = "multiply"
//!
//! [[exports]]
//! format = "png"
//! resolution = "original"
//!
//! [[exports]]
//! format = "jpeg"
//! resolution = { width = 1200, height = 628 }
//! quality = 0.85
//! dpi = 150
//! ```
//!
//! ## Layout
//!
//! One `[[logos]]` entry places that logo in the whole container. Two or more
//! (up to six) switch to slotted layout: the container is split into equal
//! columns in file order, and an entry without `path` leaves its column
//! empty.
//!
//! Arrays replace rather than merge: a job that lists `[[exports]]` replaces
//! the stock export list entirely.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    BackgroundPlate, ContainerRegion, DEFAULT_DPI, DEFAULT_MAX_INPUT_BYTES, ExportFormat,
    ExportSettings, LogoTransform, MAX_SLOTS, PRESETS, Quality, Resolution,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// A poster job loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Base poster image. Relative paths resolve against the job file.
    pub base: String,
    /// Free-text tag for output filenames.
    pub tag: String,
    /// Width of the canvas the pixel values (radii, borders) were authored on.
    pub preview_width: u32,
    /// Inputs larger than this are rejected before decoding.
    pub max_input_bytes: u64,
    pub region: ContainerRegion,
    pub plate: BackgroundPlate,
    pub logos: Vec<LogoConfig>,
    pub exports: Vec<ExportConfig>,
    pub processing: ProcessingConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            base: String::new(),
            tag: "poster".to_string(),
            preview_width: 960,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES as u64,
            region: ContainerRegion::default(),
            plate: BackgroundPlate::default(),
            logos: Vec::new(),
            exports: vec![ExportConfig::default()],
            processing: ProcessingConfig::default(),
        }
    }
}

/// One logo entry. No `path` means an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogoConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub transform: LogoTransform,
}

/// One export target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub resolution: ResolutionConfig,
    /// JPEG quality in (0, 1].
    pub quality: f32,
    pub dpi: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            resolution: ResolutionConfig::default(),
            quality: Quality::default().value(),
            dpi: DEFAULT_DPI,
        }
    }
}

/// `"original"`, a preset name, or an explicit `{ width, height }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolutionConfig {
    Named(String),
    Custom { width: u32, height: u32 },
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        ResolutionConfig::Named("original".to_string())
    }
}

impl ResolutionConfig {
    pub fn to_resolution(&self) -> Result<Resolution, ConfigError> {
        match self {
            ResolutionConfig::Named(name) => Resolution::named(name).ok_or_else(|| {
                let known: Vec<&str> = PRESETS.iter().map(|(name, _, _)| *name).collect();
                ConfigError::Validation(format!(
                    "unknown resolution {name:?}; expected \"original\", one of [{}], or {{ width, height }}",
                    known.join(", ")
                ))
            }),
            ResolutionConfig::Custom { width, height } => {
                if *width == 0 || *height == 0 {
                    return Err(ConfigError::Validation(
                        "custom resolution width and height must be non-zero".into(),
                    ));
                }
                Ok(Resolution::custom(*width, *height))
            }
        }
    }
}

impl ExportConfig {
    pub fn to_settings(&self) -> Result<ExportSettings, ConfigError> {
        Ok(ExportSettings {
            format: self.format,
            resolution: self.resolution.to_resolution()?,
            quality: Quality::new(self.quality),
            dpi: self.dpi,
        })
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel export workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
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

fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation(msg()))
    }
}

fn validate_transform(i: usize, t: &LogoTransform) -> Result<(), ConfigError> {
    let at = |field: &str| format!("logos[{i}].transform.{field}");
    check(t.zoom_percent.is_finite() && t.zoom_percent > 0.0, || {
        format!("{} must be greater than 0", at("zoom_percent"))
    })?;
    check((-180.0..=180.0).contains(&t.rotation_degrees), || {
        format!("{} must be between -180 and 180", at("rotation_degrees"))
    })?;
    check((0.0..=100.0).contains(&t.opacity_percent), || {
        format!("{} must be 0-100", at("opacity_percent"))
    })?;
    check(t.corner_radius_px.is_finite() && t.corner_radius_px >= 0.0, || {
        format!("{} must not be negative", at("corner_radius_px"))
    })?;
    check(t.border_width_px.is_finite() && t.border_width_px >= 0.0, || {
        format!("{} must not be negative", at("border_width_px"))
    })?;
    check(
        t.horizontal_offset_percent.is_finite() && t.vertical_offset_percent.is_finite(),
        || format!("logos[{i}] offsets must be finite numbers"),
    )
}

impl JobConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(!self.base.trim().is_empty(), || "base must be set".into())?;
        check(self.preview_width > 0, || {
            "preview_width must be greater than 0".into()
        })?;
        check(self.max_input_bytes > 0, || {
            "max_input_bytes must be greater than 0".into()
        })?;
        check(self.region.is_valid(), || {
            "region must satisfy 0 <= top < bottom <= 1 and 0 <= h_padding < 0.5".into()
        })?;

        let p = &self.plate;
        check(
            p.horizontal_padding_percent >= 0.0
                && p.vertical_padding_percent >= 0.0
                && p.corner_radius_px >= 0.0,
            || "plate paddings and corner radius must not be negative".into(),
        )?;

        check(!self.logos.is_empty(), || {
            "at least one [[logos]] entry is required".into()
        })?;
        check(self.logos.len() <= MAX_SLOTS, || {
            format!("at most {MAX_SLOTS} logos are supported")
        })?;
        if self.logos.len() == 1 {
            check(self.logos[0].path.is_some(), || {
                "logos[0].path is required when only one logo is configured".into()
            })?;
        }
        for (i, logo) in self.logos.iter().enumerate() {
            validate_transform(i, &logo.transform)?;
        }

        check(!self.exports.is_empty(), || {
            "at least one [[exports]] entry is required".into()
        })?;
        for (i, export) in self.exports.iter().enumerate() {
            check(export.quality > 0.0 && export.quality <= 1.0, || {
                format!("exports[{i}].quality must be in (0, 1]")
            })?;
            check(export.dpi > 0, || {
                format!("exports[{i}].dpi must be greater than 0")
            })?;
            export.resolution.to_resolution()?;
        }
        Ok(())
    }

    /// Export settings for every `[[exports]]` entry, in file order.
    pub fn export_settings(&self) -> Result<Vec<ExportSettings>, ConfigError> {
        self.exports.iter().map(ExportConfig::to_settings).collect()
    }

    /// True when the logos go into equal-width slots rather than one fit.
    pub fn is_slotted(&self) -> bool {
        self.logos.len() > 1
    }
}

/// Resolve an input path from the job file against the job file's directory.
pub fn resolve_input_path(config_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        config_dir.join(p)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(JobConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
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

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<JobConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: JobConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Parse job TOML text on top of the stock defaults.
pub fn parse_config(text: &str) -> Result<JobConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(text)?;
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Load a job file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<JobConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock job file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Poster Brand Job
# ================
# Values shown below are the defaults unless marked otherwise.
# Unknown keys will cause an error.

# Base poster image (required). Relative paths resolve against this file.
base = "poster.png"

# Free-text tag used in output filenames: poster_<tag>_<width>x<height>.<ext>
tag = "poster"

# Width of the preview canvas that pixel values (corner radii, border widths)
# were chosen on. Exports scale those values by output_width / preview_width.
preview_width = 960

# Input files larger than this many bytes are rejected (25 MiB).
max_input_bytes = 26214400

# ---------------------------------------------------------------------------
# Logo container, as fractions of the canvas
# ---------------------------------------------------------------------------
[region]
# Top and bottom edges, as fractions of the canvas height.
top = 0.62
bottom = 0.76
# Empty margin on each side, as a fraction of the canvas width.
h_padding = 0.35

# ---------------------------------------------------------------------------
# White background plate behind the logo(s)
# ---------------------------------------------------------------------------
[plate]
enabled = false
# Extra space on each side, as a percentage of the logo (or slot group) size.
horizontal_padding_percent = 10.0
vertical_padding_percent = 10.0
corner_radius_px = 12.0

# ---------------------------------------------------------------------------
# Logos
# ---------------------------------------------------------------------------
# One entry: the logo fills the container. Two to six entries: the container
# is split into equal columns in order; leave out `path` for an empty column.
[[logos]]
path = "logo.png"

[logos.transform]
# Size relative to fitting the container (or 85% of the slot).
zoom_percent = 100.0
# Rotation around the logo center, -180 to 180.
rotation_degrees = 0.0
# 0 = invisible, 100 = opaque.
opacity_percent = 100.0
corner_radius_px = 0.0
# 0 disables the border.
border_width_px = 0.0
border_color = "#000000"
# source-over, multiply, screen, overlay, darken, lighten, color-dodge,
# color-burn, hard-light, soft-light, difference, exclusion
blend_mode = "source-over"
# Shift as a percentage of the container (or slot) width / height.
horizontal_offset_percent = 0.0
vertical_offset_percent = 0.0

# ---------------------------------------------------------------------------
# Exports (one file per entry)
# ---------------------------------------------------------------------------
[[exports]]
# png or jpeg
format = "png"
# "original", a preset (hd, fhd-portrait, 2k, 4k, a4-300, a3-300),
# or { width = 1920, height = 1080 }
resolution = "original"
# JPEG quality, 0.01 to 1.0. Ignored for PNG.
quality = 0.92
# Physical print resolution embedded in the file.
dpi = 300

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel export workers.
# Omit to use all CPU cores. Values larger than the core count are clamped.
# max_processes = 4
"##
}
