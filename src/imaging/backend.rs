//! Raster backend trait and shared types.
//!
//! The [`RasterBackend`] trait is the boundary to everything that touches
//! codecs: decoding input bytes into a pixel buffer and encoding a finished
//! surface into PNG/JPEG bytes. Geometry, compositing and DPI surgery never
//! call a codec directly, so tests can swap in a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): `image` for raster
//! formats and `resvg` for SVG logos, all statically linked.

use super::params::{ExportFormat, Quality};
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for raster backends.
///
/// Surfaces are straight-alpha RGBA8 buffers. `Sync` so one backend can serve
/// several exports running on the rayon pool.
pub trait RasterBackend: Sync {
    /// Read pixel dimensions without a full decode where the format allows.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode PNG/JPEG/WEBP/SVG bytes into an RGBA surface.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, BackendError>;

    /// Encode a surface. `quality` is only consulted for JPEG.
    fn encode(
        &self,
        surface: &RgbaImage,
        format: ExportFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
