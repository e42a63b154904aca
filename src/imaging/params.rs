//! Parameter types for compositing and export.
//!
//! These structs describe *what* to draw and *how* to export it, not how the
//! pixels get there. They are the interface between configuration (TOML job
//! files, callers of the library) and the [`compositor`](super::compositor) /
//! [`operations`](super::operations) modules. Every type is a plain value:
//! callers build them once and pass them by value or shared reference, nothing
//! mutates them mid-composite.
//!
//! ## Types
//!
//! - [`LogoTransform`]: zoom, rotation, opacity, corners, border, blend mode and offsets for one logo.
//! - [`BlendMode`]: composite operation used for the logo draw step.
//! - [`Color`]: RGBA8 color parsed from `#rgb`, `#rrggbb` or `#rrggbbaa`.
//! - [`BackgroundPlate`]: optional white plate drawn behind the logo(s).
//! - [`ExportFormat`], [`Resolution`], [`Quality`], [`ExportSettings`]: what the exported file looks like.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Logo appearance
// =============================================================================

/// Composite operation applied while drawing a logo onto the poster.
///
/// Names follow the canvas `globalCompositeOperation` vocabulary so that job
/// files read the same as the editor controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    #[serde(alias = "normal")]
    SourceOver,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

/// Straight-alpha RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        // #rgb expands each nibble (f -> ff)
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);

        match hex.len() {
            3 => Ok(Color::rgb(
                nibble(0).map_err(|_| err())?,
                nibble(1).map_err(|_| err())?,
                nibble(2).map_err(|_| err())?,
            )),
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(err()),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Per-logo transform and appearance.
///
/// Created with [`Default`] when a logo is added (zoom 100, no rotation, fully
/// opaque, centered). Pixel quantities (`corner_radius_px`, `border_width_px`)
/// are expressed at preview scale; the compositor rescales them for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogoTransform {
    /// Zoom relative to the fit-to-container size (100 = fit).
    pub zoom_percent: f64,
    /// Rotation around the logo center, in degrees (−180..180).
    pub rotation_degrees: f64,
    /// Opacity (0..100).
    pub opacity_percent: f64,
    pub corner_radius_px: f64,
    pub border_width_px: f64,
    pub border_color: Color,
    pub blend_mode: BlendMode,
    /// Horizontal shift as a percentage of the container width.
    pub horizontal_offset_percent: f64,
    /// Vertical shift as a percentage of the container height.
    pub vertical_offset_percent: f64,
}

impl Default for LogoTransform {
    fn default() -> Self {
        Self {
            zoom_percent: 100.0,
            rotation_degrees: 0.0,
            opacity_percent: 100.0,
            corner_radius_px: 0.0,
            border_width_px: 0.0,
            border_color: Color::BLACK,
            blend_mode: BlendMode::SourceOver,
            horizontal_offset_percent: 0.0,
            vertical_offset_percent: 0.0,
        }
    }
}

impl LogoTransform {
    /// Opacity as a 0..1 alpha multiplier.
    pub fn alpha(&self) -> f32 {
        (self.opacity_percent / 100.0).clamp(0.0, 1.0) as f32
    }
}

/// Solid white plate drawn behind the logo(s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundPlate {
    pub enabled: bool,
    /// Extra width on each side, as a percentage of the logo width.
    pub horizontal_padding_percent: f64,
    /// Extra height on each side, as a percentage of the logo height.
    pub vertical_padding_percent: f64,
    pub corner_radius_px: f64,
}

impl Default for BackgroundPlate {
    fn default() -> Self {
        Self {
            enabled: false,
            horizontal_padding_percent: 10.0,
            vertical_padding_percent: 10.0,
            corner_radius_px: 12.0,
        }
    }
}

// =============================================================================
// Export settings
// =============================================================================

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => f.write_str("png"),
            ExportFormat::Jpeg => f.write_str("jpeg"),
        }
    }
}

/// Named output sizes offered alongside "original".
pub const PRESETS: &[(&str, u32, u32)] = &[
    ("hd", 1920, 1080),
    ("fhd-portrait", 1080, 1920),
    ("2k", 2560, 1440),
    ("4k", 3840, 2160),
    ("a4-300", 2480, 3508),
    ("a3-300", 3508, 4961),
];

/// Output pixel size: the base image's own size, or a fixed preset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Original,
    Preset {
        name: String,
        width: u32,
        height: u32,
    },
}

impl Resolution {
    /// Look up a named preset. `"original"` maps to [`Resolution::Original`].
    pub fn named(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("original") {
            return Some(Resolution::Original);
        }
        PRESETS
            .iter()
            .find(|(preset, _, _)| preset.eq_ignore_ascii_case(name))
            .map(|&(preset, width, height)| Resolution::Preset {
                name: preset.to_string(),
                width,
                height,
            })
    }

    /// A preset with explicit dimensions, labelled `WxH`.
    pub fn custom(width: u32, height: u32) -> Self {
        Resolution::Preset {
            name: format!("{width}x{height}"),
            width,
            height,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Resolution::Original => "original",
            Resolution::Preset { name, .. } => name,
        }
    }
}

/// Lossy encoding quality as a fraction in (0, 1]. Only used for JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        Self(value.clamp(0.01, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the encoder's 1..=100 scale.
    pub fn encoder_value(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.92)
    }
}

pub const DEFAULT_DPI: u32 = 300;

/// Everything needed to produce one exported file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub resolution: Resolution,
    pub quality: Quality,
    pub dpi: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            resolution: Resolution::Original,
            quality: Quality::default(),
            dpi: DEFAULT_DPI,
        }
    }
}
