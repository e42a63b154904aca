//! Pure geometry for logo placement and output sizing.
//!
//! All functions here are pure and testable without any pixels. Positions are
//! `f64` pixel coordinates with the origin at the canvas top-left; the same
//! functions run at preview scale and at export scale, only the canvas size
//! changes.

use super::params::{BackgroundPlate, LogoTransform, Resolution};

/// Smallest output edge ever produced, in pixels.
pub const MIN_OUTPUT_DIM: u32 = 16;

/// Maximum number of logos in slotted layout.
pub const MAX_SLOTS: usize = 6;

/// Fraction of a slot (each axis) a logo may fill in slotted layout.
pub const SLOT_FILL: f64 = 0.85;

/// Where logos go on the poster, as fractions of the canvas size.
///
/// `top`/`bottom` are fractions of the canvas height. `h_padding` is the
/// fraction of the canvas width left empty on *each* side, so the container
/// spans `1 - 2 * h_padding` of the width.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerRegion {
    pub top: f64,
    pub bottom: f64,
    pub h_padding: f64,
}

impl Default for ContainerRegion {
    fn default() -> Self {
        Self {
            top: 0.62,
            bottom: 0.76,
            h_padding: 0.35,
        }
    }
}

impl ContainerRegion {
    /// Build a region, clamping into `0 <= top <= bottom <= 1` and
    /// `0 <= h_padding < 0.5`.
    pub fn new(top: f64, bottom: f64, h_padding: f64) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        let top = finite(top).clamp(0.0, 1.0);
        let bottom = finite(bottom).clamp(top, 1.0);
        let h_padding = finite(h_padding).clamp(0.0, 0.499);
        Self {
            top,
            bottom,
            h_padding,
        }
    }

    pub fn is_valid(&self) -> bool {
        (0.0..1.0).contains(&self.top)
            && self.top < self.bottom
            && self.bottom <= 1.0
            && (0.0..0.5).contains(&self.h_padding)
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.right(), self.bottom())
    }
}

/// A resolved logo position: the unrotated bounding box plus the effective
/// scale (fit × zoom) that maps natural logo pixels into it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogoPlacement {
    pub rect: Rect,
    pub scale: f64,
}

impl LogoPlacement {
    pub fn is_drawable(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0 && !self.rect.is_empty()
    }
}

/// Natural size and transform of one logo, as the geometry sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoSpec {
    pub width: f64,
    pub height: f64,
    pub transform: LogoTransform,
}

/// Container rectangle in canvas pixels.
pub fn container_rect(region: &ContainerRegion, canvas_w: f64, canvas_h: f64) -> Rect {
    Rect {
        x: canvas_w * region.h_padding,
        y: canvas_h * region.top,
        w: canvas_w * (1.0 - 2.0 * region.h_padding),
        h: canvas_h * (region.bottom - region.top),
    }
}

/// Largest scale that fits `logo` inside `box_w × box_h` keeping aspect ratio.
///
/// Returns 0 for degenerate input so callers never see NaN or infinity.
pub fn fit_scale(box_w: f64, box_h: f64, logo_w: f64, logo_h: f64) -> f64 {
    if !(logo_w > 0.0 && logo_h > 0.0 && box_w > 0.0 && box_h > 0.0) {
        return 0.0;
    }
    let scale = (box_w / logo_w).min(box_h / logo_h);
    if scale.is_finite() { scale } else { 0.0 }
}

/// Fit, zoom, center inside `area`, then shift by the transform offsets.
///
/// `fit_w`/`fit_h` bound the fit (the full area for single-logo layout, a
/// margin-reduced slot for slotted layout). Offsets are fractions of `area`
/// and are never clamped: a logo pushed past the edge stays there.
fn place(area: Rect, fit_w: f64, fit_h: f64, logo: &LogoSpec) -> LogoPlacement {
    let t = &logo.transform;
    let scale = fit_scale(fit_w, fit_h, logo.width, logo.height) * (t.zoom_percent / 100.0);
    if !(scale.is_finite() && scale > 0.0) {
        return LogoPlacement::default();
    }

    let w = logo.width * scale;
    let h = logo.height * scale;
    let x0 = area.x + (area.w - w) / 2.0;
    let y0 = area.y + (area.h - h) / 2.0;

    LogoPlacement {
        rect: Rect {
            x: x0 + (t.horizontal_offset_percent / 100.0) * area.w,
            y: y0 + (t.vertical_offset_percent / 100.0) * area.h,
            w,
            h,
        },
        scale,
    }
}

/// Resolve the rectangle of a single logo inside the container region.
///
/// # Examples
/// ```
/// # use poster_brand::imaging::{ContainerRegion, LogoTransform, resolve_logo_rect};
/// let region = ContainerRegion::new(0.5, 1.0, 0.0);
/// let placed = resolve_logo_rect(&region, 200.0, 200.0, 100.0, 50.0, &LogoTransform::default());
/// // fits the 200×100 container exactly
/// assert_eq!((placed.rect.x, placed.rect.y, placed.rect.w, placed.rect.h), (0.0, 100.0, 200.0, 100.0));
/// assert_eq!(placed.scale, 2.0);
/// ```
pub fn resolve_logo_rect(
    region: &ContainerRegion,
    canvas_w: f64,
    canvas_h: f64,
    logo_w: f64,
    logo_h: f64,
    transform: &LogoTransform,
) -> LogoPlacement {
    let container = container_rect(region, canvas_w, canvas_h);
    let logo = LogoSpec {
        width: logo_w,
        height: logo_h,
        transform: *transform,
    };
    place(container, container.w, container.h, &logo)
}

/// Split the container into `n` equal-width slots, left to right.
pub fn slot_bounds(region: &ContainerRegion, canvas_w: f64, canvas_h: f64, n: usize) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let container = container_rect(region, canvas_w, canvas_h);
    let slot_w = container.w / n as f64;
    (0..n)
        .map(|i| Rect {
            x: container.x + slot_w * i as f64,
            y: container.y,
            w: slot_w,
            h: container.h,
        })
        .collect()
}

/// Resolve one rectangle per slot. Empty slots still take up their width and
/// resolve to `None`; output order matches input order.
pub fn resolve_slot_rects(
    region: &ContainerRegion,
    canvas_w: f64,
    canvas_h: f64,
    logos: &[Option<LogoSpec>],
) -> Vec<Option<LogoPlacement>> {
    slot_bounds(region, canvas_w, canvas_h, logos.len())
        .into_iter()
        .zip(logos)
        .map(|(slot, logo)| {
            logo.as_ref()
                .map(|logo| place(slot, slot.w * SLOT_FILL, slot.h * SLOT_FILL, logo))
        })
        .collect()
}

/// Expand a logo rectangle outward by the plate padding percentages.
pub fn plate_rect(logo: Rect, plate: &BackgroundPlate) -> Rect {
    let pad_x = logo.w * plate.horizontal_padding_percent / 100.0;
    let pad_y = logo.h * plate.vertical_padding_percent / 100.0;
    Rect {
        x: logo.x - pad_x,
        y: logo.y - pad_y,
        w: logo.w + 2.0 * pad_x,
        h: logo.h + 2.0 * pad_y,
    }
}

/// Bounding rectangle of all given rectangles, `None` if there are none.
pub fn union_rect(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|a, b| {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Rect {
            x,
            y,
            w: a.right().max(b.right()) - x,
            h: a.bottom().max(b.bottom()) - y,
        }
    })
}

/// Output pixel size for an export, independent of any preview size.
///
/// Both edges are floored at [`MIN_OUTPUT_DIM`].
pub fn resolve_output_size(resolution: &Resolution, base_w: u32, base_h: u32) -> (u32, u32) {
    let (w, h) = match resolution {
        Resolution::Original => (base_w, base_h),
        Resolution::Preset { width, height, .. } => (*width, *height),
    };
    (w.max(MIN_OUTPUT_DIM), h.max(MIN_OUTPUT_DIM))
}

/// Preview canvas size: `preview_w` wide, height following the base aspect.
pub fn preview_size(base_w: u32, base_h: u32, preview_w: u32) -> (u32, u32) {
    let w = preview_w.max(MIN_OUTPUT_DIM);
    if base_w == 0 {
        return (w, w);
    }
    let h = (w as f64 * base_h as f64 / base_w as f64).round() as u32;
    (w, h.max(MIN_OUTPUT_DIM))
}

/// Factor applied to absolute pixel values (radii, strokes) when rendering at
/// `output_w` something that was designed against a `preview_w` canvas.
pub fn pixel_scale(output_w: u32, preview_w: Option<u32>) -> f64 {
    match preview_w {
        Some(p) if p > 0 => output_w as f64 / p as f64,
        _ => 1.0,
    }
}
