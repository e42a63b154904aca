//! High-level poster operations.
//!
//! These functions combine geometry, compositing, the backend and DPI
//! injection. They take a [`PosterJob`] plus export settings, render a fresh
//! surface at the requested size, and hand back encoded bytes.

use super::backend::{BackendError, RasterBackend};
use super::calculations::{ContainerRegion, pixel_scale, preview_size, resolve_output_size};
use super::compositor::{Layout, composite};
use super::dpi::set_dpi;
use super::params::{BackgroundPlate, ExportSettings};
use crate::naming::export_filename;
use image::RgbaImage;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

/// Default ceiling on input file size (25 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 25 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid input image: {0}")]
    InvalidInputImage(String),
    #[error("Encoding failed: {0}")]
    EncodingFailure(String),
}

/// Result type for poster operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Everything needed to draw a poster, independent of output size.
#[derive(Debug, Clone)]
pub struct PosterJob {
    pub base: RgbaImage,
    pub region: ContainerRegion,
    pub layout: Layout,
    pub plate: BackgroundPlate,
    /// Width of the canvas the pixel values (radii, borders) were chosen on.
    /// `None` means they are already in output pixels.
    pub preview_width: Option<u32>,
}

/// An encoded export ready to be written or sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Decode an input file, enforcing the size ceiling.
///
/// Every failure, including oversize input, is reported as
/// [`ExportError::InvalidInputImage`] before any compositing happens.
pub fn decode_input(
    backend: &impl RasterBackend,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<RgbaImage> {
    if bytes.is_empty() {
        return Err(ExportError::InvalidInputImage("file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(ExportError::InvalidInputImage(format!(
            "file is {} bytes, limit is {max_bytes}",
            bytes.len()
        )));
    }
    let image = backend
        .decode(bytes)
        .map_err(|e| ExportError::InvalidInputImage(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::InvalidInputImage("image has no pixels".into()));
    }
    Ok(image)
}

/// Composite the job onto a new `width × height` surface.
pub fn render_at(job: &PosterJob, width: u32, height: u32) -> RgbaImage {
    let mut surface = RgbaImage::new(width, height);
    let scale = pixel_scale(width, job.preview_width);
    composite(
        &mut surface,
        &job.base,
        &job.region,
        &job.layout,
        &job.plate,
        scale,
    );
    surface
}

/// Render the interactive-preview canvas: `preview_w` wide, base aspect kept.
///
/// Pixel values scale against `job.preview_width` like any export, so a
/// preview drawn at another width keeps the same proportions.
pub fn render_preview(job: &PosterJob, preview_w: u32) -> RgbaImage {
    let (width, height) = preview_size(job.base.width(), job.base.height(), preview_w);
    render_at(job, width, height)
}

/// Render, encode and tag one export.
#[tracing::instrument(skip_all, fields(format = %settings.format, resolution = settings.resolution.label()))]
pub fn export_poster(
    backend: &impl RasterBackend,
    job: &PosterJob,
    settings: &ExportSettings,
    tag: &str,
) -> Result<ExportedFile> {
    let (width, height) =
        resolve_output_size(&settings.resolution, job.base.width(), job.base.height());
    debug!(width, height, "compositing");
    let surface = render_at(job, width, height);

    let encoded = backend
        .encode(&surface, settings.format, settings.quality)
        .map_err(|e: BackendError| ExportError::EncodingFailure(e.to_string()))?;
    if encoded.is_empty() {
        return Err(ExportError::EncodingFailure(
            "encoder produced no bytes".into(),
        ));
    }

    let bytes = set_dpi(&encoded, settings.format, settings.dpi);
    let filename = export_filename(tag, width, height, settings.format);
    info!(%filename, bytes = bytes.len(), dpi = settings.dpi, "exported");

    Ok(ExportedFile {
        bytes,
        mime: settings.format.mime_type(),
        filename,
        width,
        height,
    })
}

/// Run several independent exports in parallel.
///
/// Results come back in the same order as `settings`; one failing export does
/// not stop the others.
pub fn export_all(
    backend: &impl RasterBackend,
    job: &PosterJob,
    settings: &[ExportSettings],
    tag: &str,
) -> Vec<Result<ExportedFile>> {
    settings
        .par_iter()
        .map(|s| export_poster(backend, job, s, tag))
        .collect()
}
