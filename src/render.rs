//! Job rendering: from a TOML job file to exported poster files.
//!
//! This is the stage the `render` command runs. It loads the job, reads and
//! decodes every input, assembles a [`PosterJob`], runs all exports on the
//! rayon pool and writes the resulting files.
//!
//! ```text
//! job.toml ──► JobConfig ──► decode base + logos ──► PosterJob
//!                                                        │
//!                      ┌─────────────────────────────────┤ (parallel)
//!                      ▼                 ▼               ▼
//!             poster_acme_…png  poster_acme_…jpg      …
//! ```
//!
//! Input problems (missing file, undecodable or oversize image) abort the job
//! before anything is drawn. A failing export (encode or write) does not stop
//! the others; it is recorded in the [`RenderReport`] and the caller decides
//! what to do.

use crate::config::{ConfigError, JobConfig, load_config, resolve_input_path};
use crate::imaging::{
    ExportError, ExportFormat, ExportSettings, ExportedFile, Layout, LogoInput, PosterJob, RasterBackend,
    RustBackend, decode_input, export_all,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("{}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: ExportError,
    },
}

/// A decoded input file.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSummary {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// A written export.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
    pub dpi: u32,
}

/// What happened to one `[[exports]]` entry.
#[derive(Debug)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub resolution: String,
    pub result: Result<WrittenFile, String>,
}

#[derive(Debug)]
pub struct RenderReport {
    pub base: InputSummary,
    /// One entry per configured logo; `None` for empty slots.
    pub logos: Vec<Option<InputSummary>>,
    pub exports: Vec<ExportOutcome>,
}

impl RenderReport {
    pub fn failed_count(&self) -> usize {
        self.exports.iter().filter(|e| e.result.is_err()).count()
    }
}

/// Render a job file with the production backend.
pub fn render(config_path: &Path, out_dir: Option<&Path>) -> Result<RenderReport, RenderError> {
    let backend = RustBackend::new();
    render_with_backend(&backend, config_path, out_dir)
}

/// Render a job file using a specific backend (allows testing with mock).
///
/// Output goes to `out_dir`, or next to the job file when `None`.
pub fn render_with_backend(
    backend: &impl RasterBackend,
    config_path: &Path,
    out_dir: Option<&Path>,
) -> Result<RenderReport, RenderError> {
    let config = load_config(config_path)?;
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let out_dir = out_dir.unwrap_or(config_dir);
    render_config(backend, &config, config_dir, out_dir)
}

/// Render an already-loaded job. Relative input paths resolve against
/// `config_dir`.
pub fn render_config(
    backend: &impl RasterBackend,
    config: &JobConfig,
    config_dir: &Path,
    out_dir: &Path,
) -> Result<RenderReport, RenderError> {
    let max_bytes = usize::try_from(config.max_input_bytes).unwrap_or(usize::MAX);
    let settings = config.export_settings()?;

    let base_path = resolve_input_path(config_dir, &config.base);
    let base = load_input(backend, &base_path, max_bytes)?;
    let base_summary = summarize(&base_path, &base);

    let mut logos = Vec::with_capacity(config.logos.len());
    let mut logo_summaries = Vec::with_capacity(config.logos.len());
    for logo in &config.logos {
        match &logo.path {
            Some(p) => {
                let path = resolve_input_path(config_dir, p);
                let image = load_input(backend, &path, max_bytes)?;
                logo_summaries.push(Some(summarize(&path, &image)));
                logos.push(Some(LogoInput::new(image, logo.transform)));
            }
            None => {
                logo_summaries.push(None);
                logos.push(None);
            }
        }
    }

    let layout = if config.is_slotted() {
        Layout::Slots(logos)
    } else {
        // Validation guarantees a single entry has a path
        match logos.into_iter().next().flatten() {
            Some(logo) => Layout::Single(logo),
            None => Layout::Slots(Vec::new()),
        }
    };

    let job = PosterJob {
        base,
        region: config.region,
        layout,
        plate: config.plate,
        preview_width: Some(config.preview_width),
    };

    warn_on_duplicate_names(&settings, &job);

    std::fs::create_dir_all(out_dir)?;
    let results = export_all(backend, &job, &settings, &config.tag);

    let mut exports = Vec::with_capacity(results.len());
    for (settings, result) in settings.iter().zip(results) {
        let result = result
            .map_err(|e| e.to_string())
            .and_then(|file| write_export(out_dir, &file, settings.dpi));
        if let Err(e) = &result {
            warn!(error = %e, "export failed");
        }
        exports.push(ExportOutcome {
            format: settings.format,
            resolution: settings.resolution.label().to_string(),
            result,
        });
    }

    Ok(RenderReport {
        base: base_summary,
        logos: logo_summaries,
        exports,
    })
}

/// Write one encoded export. A write error is reported against that export
/// only.
fn write_export(out_dir: &Path, file: &ExportedFile, dpi: u32) -> Result<WrittenFile, String> {
    let path = out_dir.join(&file.filename);
    std::fs::write(&path, &file.bytes)
        .map_err(|e| format!("Write failed: {}: {e}", path.display()))?;
    info!(path = %path.display(), "wrote export");
    Ok(WrittenFile {
        path,
        width: file.width,
        height: file.height,
        size_bytes: file.bytes.len(),
        dpi,
    })
}

fn load_input(
    backend: &impl RasterBackend,
    path: &Path,
    max_bytes: usize,
) -> Result<image::RgbaImage, RenderError> {
    if !path.exists() {
        return Err(RenderError::InputNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    decode_input(backend, &bytes, max_bytes).map_err(|source| RenderError::Input {
        path: path.to_path_buf(),
        source,
    })
}

fn summarize(path: &Path, image: &image::RgbaImage) -> InputSummary {
    InputSummary {
        path: path.to_path_buf(),
        width: image.width(),
        height: image.height(),
    }
}

/// Two exports with the same format and output size share a filename; the
/// later one wins.
fn warn_on_duplicate_names(settings: &[ExportSettings], job: &PosterJob) {
    let mut seen = HashSet::new();
    for s in settings {
        let (w, h) = crate::imaging::resolve_output_size(
            &s.resolution,
            job.base.width(),
            job.base.height(),
        );
        if !seen.insert((s.format, w, h)) {
            warn!(format = %s.format, width = w, height = h, "duplicate export overwrites an earlier one");
        }
    }
}
