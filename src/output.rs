//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! Base
//!     poster.png (3000×2000)
//! Logos
//! 001 acme.svg (512×128)
//! 002 (empty)
//! 003 partner.png (800×800)
//! Exports
//! 001 png original → poster_acme_3000x2000.png (3000×2000, 300 dpi, 4.1 MB)
//! 002 jpeg 4k → failed: Encoding failed: encoder produced no bytes
//!
//! Exported 1 of 2 files
//! ```
//!
//! ## Inspect
//!
//! ```text
//! poster_acme_3000x2000.png
//!     Format: png
//!     Size: 3000×2000
//!     Density: 11811 × 11811 per meter (300 × 300 dpi)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::dpi::{read_jpeg_dpi, read_png_dpi};
use crate::imaging::{DensityUnit, ExportFormat, PhysicalDensity, RasterBackend, sniff_format};
use crate::render::{InputSummary, RenderReport};
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn input_line(input: &InputSummary) -> String {
    format!(
        "{} ({}\u{d7}{})",
        file_name(&input.path),
        input.width,
        input.height
    )
}

/// Human-readable byte size with one decimal above 1 KB.
///
/// ```text
/// 512 B
/// 1.5 KB
/// 4.1 MB
/// ```
pub fn format_bytes(n: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let f = n as f64;
    if f < KB {
        format!("{n} B")
    } else if f < MB {
        format!("{:.1} KB", f / KB)
    } else {
        format!("{:.1} MB", f / MB)
    }
}

// ============================================================================
// Render
// ============================================================================

/// Format the result of a render run.
pub fn format_render_report(report: &RenderReport) -> Vec<String> {
    let mut lines = vec![
        "Base".to_string(),
        format!("{}{}", indent(1), input_line(&report.base)),
        "Logos".to_string(),
    ];

    for (i, logo) in report.logos.iter().enumerate() {
        let detail = match logo {
            Some(input) => input_line(input),
            None => "(empty)".to_string(),
        };
        lines.push(format!("{} {}", format_index(i + 1), detail));
    }

    lines.push("Exports".to_string());
    for (i, export) in report.exports.iter().enumerate() {
        let head = format!(
            "{} {} {}",
            format_index(i + 1),
            export.format,
            export.resolution
        );
        match &export.result {
            Ok(file) => lines.push(format!(
                "{head} \u{2192} {} ({}\u{d7}{}, {} dpi, {})",
                file_name(&file.path),
                file.width,
                file.height,
                file.dpi,
                format_bytes(file.size_bytes)
            )),
            Err(e) => lines.push(format!("{head} \u{2192} failed: {e}")),
        }
    }

    let total = report.exports.len();
    let ok = total - report.failed_count();
    lines.push(String::new());
    lines.push(format!("Exported {ok} of {total} files"));
    lines
}

pub fn print_render_report(report: &RenderReport) {
    for line in format_render_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect / set-dpi
// ============================================================================

/// Container metadata of one PNG or JPEG file, as printed by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub path: String,
    /// `png`, `jpeg`, or `None` if unrecognized.
    pub format: Option<String>,
    /// Pixel size, `None` if the backend could not read it.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub density: Option<DensityReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityReport {
    pub x: u32,
    pub y: u32,
    pub unit: &'static str,
    pub dpi_x: Option<f64>,
    pub dpi_y: Option<f64>,
}

fn unit_name(unit: DensityUnit) -> &'static str {
    match unit {
        DensityUnit::Unknown => "aspect ratio only",
        DensityUnit::PerMeter => "per meter",
        DensityUnit::PerInch => "per inch",
        DensityUnit::PerCentimeter => "per centimeter",
    }
}

impl From<PhysicalDensity> for DensityReport {
    fn from(d: PhysicalDensity) -> Self {
        let dpi = d.dpi();
        Self {
            x: d.x,
            y: d.y,
            unit: unit_name(d.unit),
            dpi_x: dpi.map(|(x, _)| x),
            dpi_y: dpi.map(|(_, y)| y),
        }
    }
}

/// Build an inspect report from raw file bytes.
///
/// The pixel size comes from the backend header read; density comes from the
/// container bytes directly.
pub fn inspect_bytes(backend: &impl RasterBackend, path: &str, bytes: &[u8]) -> InspectReport {
    let format = sniff_format(bytes);
    let dims = backend.identify(bytes).ok();
    let density = match format {
        Some(ExportFormat::Png) => read_png_dpi(bytes),
        Some(ExportFormat::Jpeg) => read_jpeg_dpi(bytes),
        None => None,
    };
    InspectReport {
        path: path.to_string(),
        format: format.map(|f| f.to_string()),
        width: dims.map(|d| d.width),
        height: dims.map(|d| d.height),
        density: density.map(DensityReport::from),
    }
}

fn format_density(d: &DensityReport) -> String {
    match (d.dpi_x, d.dpi_y) {
        (Some(x), Some(y)) => format!(
            "{} \u{d7} {} {} ({:.0} \u{d7} {:.0} dpi)",
            d.x, d.y, d.unit, x, y
        ),
        _ => format!("{} \u{d7} {} {}", d.x, d.y, d.unit),
    }
}

pub fn format_inspect(report: &InspectReport) -> Vec<String> {
    vec![
        report.path.clone(),
        format!(
            "{}Format: {}",
            indent(1),
            report.format.as_deref().unwrap_or("unrecognized")
        ),
        format!(
            "{}Size: {}",
            indent(1),
            match (report.width, report.height) {
                (Some(w), Some(h)) => format!("{w}\u{d7}{h}"),
                _ => "unknown".to_string(),
            }
        ),
        format!(
            "{}Density: {}",
            indent(1),
            report
                .density
                .as_ref()
                .map(format_density)
                .unwrap_or_else(|| "not set".to_string())
        ),
    ]
}

pub fn print_inspect(report: &InspectReport) {
    for line in format_inspect(report) {
        println!("{}", line);
    }
}

/// One line confirming a DPI rewrite.
pub fn format_set_dpi(input: &Path, output: &Path, format: ExportFormat, dpi: u32) -> String {
    if input == output {
        format!("{}: {} set to {} dpi", input.display(), format, dpi)
    } else {
        format!(
            "{} \u{2192} {}: {} set to {} dpi",
            input.display(),
            output.display(),
            format,
            dpi
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::set_dpi;
    use crate::render::{ExportOutcome, WrittenFile};
    use std::path::PathBuf;

    fn summary(name: &str, width: u32, height: u32) -> InputSummary {
        InputSummary {
            path: PathBuf::from("/jobs").join(name),
            width,
            height,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(4 * 1024 * 1024 + 100 * 1024), "4.1 MB");
    }

    // =========================================================================
    // Render
    // =========================================================================

    #[test]
    fn render_report_lists_inputs_and_exports() {
        let report = RenderReport {
            base: summary("poster.png", 3000, 2000),
            logos: vec![Some(summary("acme.svg", 512, 128)), None],
            exports: vec![
                ExportOutcome {
                    format: ExportFormat::Png,
                    resolution: "original".into(),
                    result: Ok(WrittenFile {
                        path: PathBuf::from("/out/poster_acme_3000x2000.png"),
                        width: 3000,
                        height: 2000,
                        size_bytes: 2048,
                        dpi: 300,
                    }),
                },
                ExportOutcome {
                    format: ExportFormat::Jpeg,
                    resolution: "4k".into(),
                    result: Err("Encoding failed: boom".into()),
                },
            ],
        };

        let lines = format_render_report(&report);
        assert_eq!(
            lines,
            vec![
                "Base",
                "    poster.png (3000\u{d7}2000)",
                "Logos",
                "001 acme.svg (512\u{d7}128)",
                "002 (empty)",
                "Exports",
                "001 png original \u{2192} poster_acme_3000x2000.png (3000\u{d7}2000, 300 dpi, 2.0 KB)",
                "002 jpeg 4k \u{2192} failed: Encoding failed: boom",
                "",
                "Exported 1 of 2 files",
            ]
        );
    }

    // =========================================================================
    // Inspect
    // =========================================================================

    fn tiny_png() -> Vec<u8> {
        let mut out = crate::imaging::dpi::PNG_SIGNATURE.to_vec();
        for (ty, data) in [(b"IHDR", vec![0u8; 13]), (b"IEND", Vec::new())] {
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            out.extend_from_slice(ty);
            out.extend_from_slice(&data);
            out.extend_from_slice(&[0, 0, 0, 0]);
        }
        out
    }

    fn sized_backend(width: u32, height: u32) -> MockBackend {
        MockBackend::with_images(vec![image::RgbaImage::new(width, height)])
    }

    #[test]
    fn inspect_png_with_density() {
        let bytes = set_dpi(&tiny_png(), ExportFormat::Png, 300);
        let backend = sized_backend(3000, 2000);
        let report = inspect_bytes(&backend, "a.png", &bytes);
        assert_eq!((report.width, report.height), (Some(3000), Some(2000)));
        assert_eq!(report.format.as_deref(), Some("png"));
        let density = report.density.clone().unwrap();
        assert_eq!(density.x, 11811);
        assert_eq!(density.unit, "per meter");

        let lines = format_inspect(&report);
        assert_eq!(lines[0], "a.png");
        assert_eq!(lines[1], "    Format: png");
        assert_eq!(lines[2], "    Size: 3000\u{d7}2000");
        assert_eq!(
            lines[3],
            "    Density: 11811 \u{d7} 11811 per meter (300 \u{d7} 300 dpi)"
        );
    }

    #[test]
    fn inspect_png_without_density() {
        let report = inspect_bytes(&sized_backend(1, 1), "a.png", &tiny_png());
        assert!(report.density.is_none());
        assert_eq!(format_inspect(&report)[3], "    Density: not set");
    }

    #[test]
    fn inspect_jpeg_density() {
        let mut jfif = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        jfif.extend_from_slice(b"JFIF\0");
        jfif.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
        let bytes = set_dpi(&jfif, ExportFormat::Jpeg, 150);

        let report = inspect_bytes(&sized_backend(1, 1), "b.jpg", &bytes);
        assert_eq!(report.format.as_deref(), Some("jpeg"));
        assert_eq!(
            format_inspect(&report)[3],
            "    Density: 150 \u{d7} 150 per inch (150 \u{d7} 150 dpi)"
        );
    }

    #[test]
    fn inspect_unrecognized() {
        let report = inspect_bytes(&MockBackend::new(), "c.gif", b"GIF89a");
        assert!(report.format.is_none());
        let lines = format_inspect(&report);
        assert_eq!(lines[1], "    Format: unrecognized");
        assert_eq!(lines[2], "    Size: unknown");
    }

    #[test]
    fn inspect_report_serializes_to_json() {
        let report = inspect_bytes(&MockBackend::new(), "c.gif", b"GIF89a");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["path"], "c.gif");
        assert!(json["format"].is_null());
    }

    #[test]
    fn set_dpi_line() {
        let p = Path::new("a.png");
        assert_eq!(
            format_set_dpi(p, p, ExportFormat::Png, 300),
            "a.png: png set to 300 dpi"
        );
        assert_eq!(
            format_set_dpi(p, Path::new("b.png"), ExportFormat::Png, 72),
            "a.png \u{2192} b.png: png set to 72 dpi"
        );
    }
}
