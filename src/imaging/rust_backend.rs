//! Pure Rust raster backend, no system libraries.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify (PNG, JPEG, WebP) | `image::ImageReader::into_dimensions` |
//! | Identify (SVG) | `usvg::Tree::size` |
//! | Decode (PNG, JPEG, WebP) | `image` crate (pure Rust decoders) |
//! | Decode (SVG) | `usvg` parse + `resvg` rasterize at intrinsic size |
//! | SVG `<text>` | `usvg::fontdb` with the system fonts, loaded once |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (RGBA8) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB8, alpha flattened onto white) |

use super::backend::{BackendError, Dimensions, RasterBackend};
use super::params::{ExportFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader, RgbImage, RgbaImage};
use std::io::Cursor;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Largest SVG raster edge. Anything bigger is almost certainly a unit mistake
/// in the file and would allocate gigabytes.
const MAX_SVG_DIM: u32 = 16_384;

/// How far into the file to look for an `<svg` tag.
const SVG_SNIFF_LEN: usize = 1024;

/// Pure Rust backend using the `image` and `resvg` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// SVG has no magic number; look for an XML prolog or `<svg` near the start.
pub(crate) fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let opens_svg = ["<?xml", "<svg", "<!--", "<!DOCTYPE", "<!doctype"]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix));
    opens_svg && text.contains("<svg")
}

/// System font database shared by every SVG parse.
fn svg_fontdb() -> Arc<usvg::fontdb::Database> {
    static FONTDB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTDB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "loaded system fonts for SVG text");
            Arc::new(db)
        })
        .clone()
}

/// Default family matching, then any installed face, so text in a logo is
/// never dropped just because the named or generic family is missing.
fn svg_font_resolver() -> usvg::FontResolver<'static> {
    let select = usvg::FontResolver::default_font_selector();
    usvg::FontResolver {
        select_font: Box::new(move |font, fontdb| {
            select(font, &mut *fontdb).or_else(|| fontdb.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

fn parse_svg(bytes: &[u8]) -> Result<usvg::Tree, BackendError> {
    let options = usvg::Options {
        fontdb: svg_fontdb(),
        font_resolver: svg_font_resolver(),
        ..usvg::Options::default()
    };
    usvg::Tree::from_data(bytes, &options)
        .map_err(|e| BackendError::Decode(format!("Failed to parse SVG: {e}")))
}

fn svg_pixel_size(tree: &usvg::Tree) -> Result<(u32, u32), BackendError> {
    fn to_px(v: f32) -> Result<u32, BackendError> {
        if !v.is_finite() || v <= 0.0 {
            return Err(BackendError::Decode("SVG has invalid width/height".into()));
        }
        let px = (v.ceil() as u32).max(1);
        if px > MAX_SVG_DIM {
            return Err(BackendError::Decode(format!(
                "SVG raster size too large: {px}px (max {MAX_SVG_DIM})"
            )));
        }
        Ok(px)
    }
    let size = tree.size();
    Ok((to_px(size.width())?, to_px(size.height())?))
}

/// Rasterize an SVG at its intrinsic size into a straight-alpha surface.
fn decode_svg(bytes: &[u8]) -> Result<RgbaImage, BackendError> {
    let tree = parse_svg(bytes)?;
    let (width, height) = svg_pixel_size(&tree)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| BackendError::Decode("Failed to allocate SVG pixmap".into()))?;
    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied alpha
    let mut data = pixmap.take();
    if data.chunks_exact(4).all(|px| px[3] == 0) {
        warn!(width, height, "SVG rendered no visible pixels");
    }
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a != 0 && a != 255 {
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            }
        }
    }

    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| BackendError::Decode("SVG pixmap has unexpected size".into()))
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Composite straight-alpha RGBA onto white, for formats without alpha.
fn flatten_onto_white(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let a = u32::from(a);
        let over_white = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

impl RasterBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        if is_svg(bytes) {
            let (width, height) = svg_pixel_size(&parse_svg(bytes)?)?;
            return Ok(Dimensions { width, height });
        }
        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError> {
        if is_svg(bytes) {
            return decode_svg(bytes);
        }
        let img = reader(bytes)?
            .decode()
            .map_err(|e| BackendError::Decode(format!("Failed to decode image: {e}")))?;
        Ok(img.to_rgba8())
    }

    fn encode(
        &self,
        surface: &RgbaImage,
        format: ExportFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let (width, height) = surface.dimensions();
        let mut out = Vec::new();
        match format {
            ExportFormat::Png => PngEncoder::new(&mut out)
                .write_image(surface.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?,
            ExportFormat::Jpeg => {
                let rgb = flatten_onto_white(surface);
                JpegEncoder::new_with_quality(&mut out, quality.encoder_value())
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?
            }
        }
        Ok(out)
    }
}
