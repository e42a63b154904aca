//! Rounded-rectangle primitives shared by clipping and stroking.
//!
//! Shapes are `kurbo` values; the compositor asks them for per-pixel coverage
//! by sampling a small grid inside each pixel. Callers that draw under a
//! transform pass a closure that maps device points into shape space.

use kurbo::{Point, Rect, RoundedRect, Shape};

/// Samples per pixel edge (4 × 4 = 16 samples per pixel).
const SUPERSAMPLE: usize = 4;

/// Rounded rectangle with the radius clamped to `[0, min(w, h) / 2]`.
pub fn rounded_rect(rect: Rect, radius: f64) -> RoundedRect {
    let rect = rect.abs();
    let max_radius = rect.width().min(rect.height()) / 2.0;
    let radius = if radius.is_finite() && max_radius.is_finite() {
        radius.clamp(0.0, max_radius.max(0.0))
    } else {
        0.0
    };
    RoundedRect::from_rect(rect, radius)
}

/// Outline of a rounded rectangle stroked with a centered pen.
///
/// The stroke covers everything inside the outline grown by half the width
/// and outside the outline shrunk by half the width.
#[derive(Debug, Clone, Copy)]
pub struct StrokeOutline {
    outer: RoundedRect,
    inner: Option<RoundedRect>,
}

impl StrokeOutline {
    pub fn new(rect: Rect, radius: f64, width: f64) -> Self {
        let rect = rect.abs();
        let half = (width.max(0.0)) / 2.0;
        let outer = rounded_rect(rect.inflate(half, half), radius + half);
        let inner = (rect.width() > width && rect.height() > width)
            .then(|| rounded_rect(rect.inflate(-half, -half), (radius - half).max(0.0)));
        Self { outer, inner }
    }

    pub fn contains(&self, pt: Point) -> bool {
        self.outer.contains(pt) && !self.inner.is_some_and(|inner| inner.contains(pt))
    }

    /// Bounding box of the stroked band.
    pub fn bounding_box(&self) -> Rect {
        self.outer.bounding_box()
    }
}

/// Fraction of the pixel whose top-left corner is `(px, py)` for which
/// `inside` holds, sampled on a regular grid.
pub fn coverage(px: f64, py: f64, inside: impl Fn(Point) -> bool) -> f32 {
    let step = 1.0 / SUPERSAMPLE as f64;
    let mut hits = 0usize;
    for sy in 0..SUPERSAMPLE {
        for sx in 0..SUPERSAMPLE {
            let pt = Point::new(
                px + (sx as f64 + 0.5) * step,
                py + (sy as f64 + 0.5) * step,
            );
            if inside(pt) {
                hits += 1;
            }
        }
    }
    hits as f32 / (SUPERSAMPLE * SUPERSAMPLE) as f32
}
