//! # Poster Brand
//!
//! Places one or more logos onto a fixed base poster and exports print-ready
//! PNG or JPEG files with the physical resolution (DPI) embedded in the file.
//!
//! # Pipeline
//!
//! Every export is a pure function of the job and its export settings:
//!
//! ```text
//! 1. Resolve   job + output size  →  logo / slot / plate rectangles
//! 2. Composite base → plate → logos → borders, on a fresh RGBA surface
//! 3. Encode    surface            →  PNG / JPEG bytes
//! 4. Tag       bytes + dpi        →  bytes with pHYs / JFIF density
//! ```
//!
//! The preview and each export run the same geometry at their own canvas size,
//! so positions are resolution-independent. Absolute pixel values (corner
//! radii, border widths) are authored against the preview width and scaled by
//! `output_width / preview_width`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, compositing, codecs and DPI tagging |
//! | [`config`] | TOML job file loading, merging with stock defaults, validation |
//! | [`render`] | Runs a job file end to end: decode inputs, export in parallel, write files |
//! | [`naming`] | `poster_<tag>_<w>x<h>.<ext>` filename convention |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Byte-Level DPI Tagging
//!
//! The DPI tag is written by editing the encoded container directly (PNG
//! `pHYs` chunk, JPEG JFIF density fields) rather than through an encoder
//! option. The same code can retag any existing file (`set-dpi`), and a file
//! that does not look like PNG or JPEG is passed through untouched: an
//! untagged image is still a valid image.
//!
//! ## Fresh Surface Per Export
//!
//! Nothing is shared between exports except read-only inputs, so
//! [`imaging::export_all`] runs them on the rayon pool without locking.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate; SVG logos are rasterized by
//! `resvg`. Shapes and transforms come from `kurbo`. No system libraries are
//! needed.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod render;
