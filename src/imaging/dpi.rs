//! Physical-resolution (DPI) tagging for encoded PNG and JPEG bytes.
//!
//! Both writers operate on already-encoded bytes and never decode pixels:
//!
//! - **PNG**: insert or replace the `pHYs` chunk (pixels per meter, unit 1)
//!   with a freshly computed CRC-32.
//! - **JPEG**: overwrite the units and density fields of the JFIF APP0
//!   segment in place (dots per inch, unit 1). Length never changes.
//!
//! PNG stores density per meter while JFIF can state inches directly, so the
//! PNG writer converts (`round(dpi / 0.0254)`) and the JPEG writer stores the
//! DPI value as-is.
//!
//! Input that does not look like the expected container is returned
//! unchanged. An untagged export is still a valid image, so a malformed
//! header is never a reason to fail or to guess.

use super::params::ExportFormat;
use tracing::debug;

// ---------------------------------------------------------------------------
// PNG layout
// ---------------------------------------------------------------------------

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// length (4) + type (4) + crc (4)
const CHUNK_OVERHEAD: usize = 12;
const IHDR: &[u8; 4] = b"IHDR";
const PHYS: &[u8; 4] = b"pHYs";
const IEND: &[u8; 4] = b"IEND";
const PHYS_PAYLOAD_LEN: usize = 9;
const PHYS_UNIT_METER: u8 = 1;
const METERS_PER_INCH: f64 = 0.0254;

/// Reflected CRC-32 polynomial used by PNG (and zlib, Ethernet, ...).
const CRC32_POLY: u32 = 0xEDB8_8320;

// ---------------------------------------------------------------------------
// JPEG / JFIF layout
// ---------------------------------------------------------------------------

const SOI_OFFSET: usize = 0;
const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0_OFFSET: usize = 2;
const APP0: [u8; 2] = [0xFF, 0xE0];
/// After the APP0 marker (2) and segment length (2).
const JFIF_ID_OFFSET: usize = 6;
const JFIF_ID: &[u8; 5] = b"JFIF\0";
/// After the identifier (5) and version (2).
const UNITS_OFFSET: usize = 13;
const X_DENSITY_OFFSET: usize = 14;
const Y_DENSITY_OFFSET: usize = 16;
const JFIF_DENSITY_END: usize = 18;
const JFIF_UNIT_INCH: u8 = 1;
const JFIF_UNIT_CENTIMETER: u8 = 2;

/// Unit of a [`PhysicalDensity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    /// Only the aspect ratio is meaningful.
    Unknown,
    PerMeter,
    PerInch,
    PerCentimeter,
}

/// Density as stored in the file, before any unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalDensity {
    pub x: u32,
    pub y: u32,
    pub unit: DensityUnit,
}

impl PhysicalDensity {
    /// Horizontal and vertical dots per inch, if the unit is physical.
    pub fn dpi(&self) -> Option<(f64, f64)> {
        let per_inch = match self.unit {
            DensityUnit::Unknown => return None,
            DensityUnit::PerMeter => METERS_PER_INCH,
            DensityUnit::PerInch => 1.0,
            DensityUnit::PerCentimeter => 2.54,
        };
        Some((self.x as f64 * per_inch, self.y as f64 * per_inch))
    }
}

/// Detect PNG or JPEG from the leading bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<ExportFormat> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        Some(ExportFormat::Png)
    } else if bytes.starts_with(&SOI) {
        Some(ExportFormat::Jpeg)
    } else {
        None
    }
}

/// Tag `bytes` (encoded as `format`) with `dpi`.
pub fn set_dpi(bytes: &[u8], format: ExportFormat, dpi: u32) -> Vec<u8> {
    match format {
        ExportFormat::Png => set_png_dpi(bytes, dpi),
        ExportFormat::Jpeg => set_jpeg_dpi(bytes, dpi),
    }
}

// =============================================================================
// CRC-32
// =============================================================================

/// CRC-32 as used by PNG chunk trailers: reflected, bit at a time, with
/// initial and final complement.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (CRC32_POLY & mask);
        }
    }
    !crc
}

// =============================================================================
// PNG
// =============================================================================

/// DPI → pixels per meter, rounded to the nearest integer.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (f64::from(dpi) / METERS_PER_INCH).round() as u32
}

/// Byte positions found by walking the chunk list.
#[derive(Debug, Default, PartialEq)]
struct PngLayout {
    /// Offset just past the IHDR chunk's CRC.
    ihdr_end: Option<usize>,
    /// Start offset and total size of the first pHYs chunk.
    phys: Option<(usize, usize)>,
}

/// Walk chunks from after the signature until IEND or the end of the buffer.
///
/// Chunk format:
///   Bytes 0-3:  data length N (big-endian u32)
///   Bytes 4-7:  chunk type (ASCII)
///   Bytes 8..:  N data bytes
///   Last 4:     CRC over type + data
///
/// A chunk whose declared length runs past the buffer stops the walk.
fn scan_png(bytes: &[u8]) -> PngLayout {
    let mut layout = PngLayout::default();
    let mut pos = PNG_SIGNATURE.len();

    while pos + 8 <= bytes.len() {
        let length = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
            as usize;
        let kind = &bytes[pos + 4..pos + 8];
        let Some(end) = length
            .checked_add(CHUNK_OVERHEAD)
            .and_then(|total| pos.checked_add(total))
        else {
            break;
        };
        if end > bytes.len() {
            break;
        }

        if kind == IHDR {
            layout.ihdr_end = Some(end);
        } else if kind == PHYS && layout.phys.is_none() {
            layout.phys = Some((pos, end - pos));
        } else if kind == IEND {
            break;
        }

        pos = end;
    }

    layout
}

/// Complete `pHYs` chunk (length, type, payload, CRC) for `dpi`.
fn build_phys_chunk(dpi: u32) -> Vec<u8> {
    let ppm = dpi_to_ppm(dpi).to_be_bytes();

    let mut body = Vec::with_capacity(4 + PHYS_PAYLOAD_LEN);
    body.extend_from_slice(PHYS);
    body.extend_from_slice(&ppm);
    body.extend_from_slice(&ppm);
    body.push(PHYS_UNIT_METER);

    let mut chunk = Vec::with_capacity(CHUNK_OVERHEAD + PHYS_PAYLOAD_LEN);
    chunk.extend_from_slice(&(PHYS_PAYLOAD_LEN as u32).to_be_bytes());
    chunk.extend_from_slice(&body);
    chunk.extend_from_slice(&crc32(&body).to_be_bytes());
    chunk
}

/// Set the physical resolution of PNG bytes.
///
/// An existing `pHYs` chunk is replaced at the same position; otherwise a new
/// one goes right after `IHDR`. Bytes without a PNG signature or without an
/// `IHDR` chunk come back unchanged.
pub fn set_png_dpi(bytes: &[u8], dpi: u32) -> Vec<u8> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        debug!("set_png_dpi: missing PNG signature, leaving bytes untouched");
        return bytes.to_vec();
    }

    let layout = scan_png(bytes);
    let (at, removed) = match (layout.phys, layout.ihdr_end) {
        (Some((start, len)), _) => (start, len),
        (None, Some(end)) => (end, 0),
        (None, None) => {
            debug!("set_png_dpi: no IHDR chunk found, leaving bytes untouched");
            return bytes.to_vec();
        }
    };

    let chunk = build_phys_chunk(dpi);
    let mut out = Vec::with_capacity(bytes.len() - removed + chunk.len());
    out.extend_from_slice(&bytes[..at]);
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&bytes[at + removed..]);
    out
}

/// Read the first `pHYs` chunk, if any.
pub fn read_png_dpi(bytes: &[u8]) -> Option<PhysicalDensity> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return None;
    }
    let (start, len) = scan_png(bytes).phys?;
    if len != CHUNK_OVERHEAD + PHYS_PAYLOAD_LEN {
        return None;
    }
    let data = &bytes[start + 8..start + 8 + PHYS_PAYLOAD_LEN];
    Some(PhysicalDensity {
        x: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
        y: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        unit: match data[8] {
            PHYS_UNIT_METER => DensityUnit::PerMeter,
            _ => DensityUnit::Unknown,
        },
    })
}

// =============================================================================
// JPEG
// =============================================================================

/// SOI at 0, APP0 at 2 and the `JFIF\0` identifier at 6, with room for the
/// density fields.
fn has_jfif_header(bytes: &[u8]) -> bool {
    bytes.len() >= JFIF_DENSITY_END
        && bytes[SOI_OFFSET..SOI_OFFSET + 2] == SOI
        && bytes[APP0_OFFSET..APP0_OFFSET + 2] == APP0
        && &bytes[JFIF_ID_OFFSET..JFIF_ID_OFFSET + JFIF_ID.len()] == JFIF_ID
}

/// Set the density of a JFIF JPEG to `dpi` dots per inch.
///
/// Overwrites the units byte and both density fields in place. Densities are
/// 16-bit, so values above 65535 saturate. Anything that is not a JFIF JPEG
/// comes back unchanged.
pub fn set_jpeg_dpi(bytes: &[u8], dpi: u32) -> Vec<u8> {
    let mut out = bytes.to_vec();
    if !has_jfif_header(&out) {
        debug!("set_jpeg_dpi: no JFIF APP0 header, leaving bytes untouched");
        return out;
    }

    let density = u16::try_from(dpi).unwrap_or(u16::MAX).to_be_bytes();
    out[UNITS_OFFSET] = JFIF_UNIT_INCH;
    out[X_DENSITY_OFFSET..X_DENSITY_OFFSET + 2].copy_from_slice(&density);
    out[Y_DENSITY_OFFSET..Y_DENSITY_OFFSET + 2].copy_from_slice(&density);
    out
}

/// Read the JFIF density fields.
pub fn read_jpeg_dpi(bytes: &[u8]) -> Option<PhysicalDensity> {
    if !has_jfif_header(bytes) {
        return None;
    }
    let field = |at: usize| u32::from(u16::from_be_bytes([bytes[at], bytes[at + 1]]));
    Some(PhysicalDensity {
        x: field(X_DENSITY_OFFSET),
        y: field(Y_DENSITY_OFFSET),
        unit: match bytes[UNITS_OFFSET] {
            JFIF_UNIT_INCH => DensityUnit::PerInch,
            JFIF_UNIT_CENTIMETER => DensityUnit::PerCentimeter,
            _ => DensityUnit::Unknown,
        },
    })
}
