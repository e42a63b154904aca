//! Poster imaging: geometry, compositing, codecs and print metadata.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (PNG, JPEG, WebP) | `image::ImageReader` |
//! | **Decode** (SVG logos) | `usvg` parse + `resvg` rasterize |
//! | **Layout math** | pure functions, [`calculations`] |
//! | **Clip / stroke shapes** | `kurbo::RoundedRect` |
//! | **Composite** | affine inverse mapping + separable blend modes |
//! | **Encode → PNG / JPEG** | `image::codecs::{png, jpeg}` |
//! | **DPI tagging** | direct PNG `pHYs` / JPEG JFIF byte surgery |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement and output sizing (unit testable)
//! - **Parameters**: Data structures describing logos, plates and exports
//! - **Shape / Compositor**: Pixel work on straight-alpha RGBA surfaces
//! - **Backend**: [`RasterBackend`] trait + [`RustBackend`]
//! - **DPI**: Container-level metadata rewriting, independent of any codec
//! - **Operations**: High-level functions combining all of the above

pub mod backend;
pub mod calculations;
pub mod compositor;
pub mod dpi;
pub mod operations;
mod params;
pub mod rust_backend;
mod shape;

pub use backend::{BackendError, Dimensions, RasterBackend};
pub use calculations::{
    ContainerRegion, LogoPlacement, MAX_SLOTS, MIN_OUTPUT_DIM, Rect, resolve_logo_rect,
    resolve_output_size, resolve_slot_rects,
};
pub use compositor::{Layout, LogoInput, composite};
pub use dpi::{DensityUnit, PhysicalDensity, set_dpi, set_jpeg_dpi, set_png_dpi, sniff_format};
pub use operations::{
    DEFAULT_MAX_INPUT_BYTES, ExportError, ExportedFile, PosterJob, decode_input, export_all,
    export_poster, render_preview,
};
pub use params::{
    BackgroundPlate, BlendMode, Color, ColorParseError, DEFAULT_DPI, ExportFormat, ExportSettings,
    LogoTransform, PRESETS, Quality, Resolution,
};
pub use rust_backend::RustBackend;
