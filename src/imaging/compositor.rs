//! Layered poster compositing.
//!
//! Draw order is fixed:
//!
//! 1. base image, stretched to the surface size
//! 2. background plate (solid white, rounded), when enabled
//! 3. each logo in slot order: rotated, scaled, faded, clipped to its rounded
//!    corners, composited with its blend mode
//! 4. each logo's border stroke, when its width is positive
//!
//! Only step 3 uses the logo's blend mode; base, plate and border always
//! composite source-over.
//!
//! Surfaces are straight-alpha RGBA8. Geometry comes from
//! [`calculations`](super::calculations) at the surface's own size, and every
//! absolute pixel value (corner radius, border width) is multiplied by the
//! caller's `pixel_scale` so an export at 4× the preview width gets 4× the
//! radius.

use super::calculations::{
    ContainerRegion, LogoPlacement, LogoSpec, Rect, plate_rect, resolve_logo_rect,
    resolve_slot_rects, union_rect,
};
use super::params::{BackgroundPlate, BlendMode, Color, LogoTransform};
use super::shape::{StrokeOutline, coverage, rounded_rect};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, Point, Shape, Vec2};
use tracing::trace;

/// A decoded logo with its transform.
#[derive(Debug, Clone)]
pub struct LogoInput {
    pub image: RgbaImage,
    pub transform: LogoTransform,
}

impl LogoInput {
    pub fn new(image: RgbaImage, transform: LogoTransform) -> Self {
        Self { image, transform }
    }

    fn spec(&self) -> LogoSpec {
        LogoSpec {
            width: self.image.width() as f64,
            height: self.image.height() as f64,
            transform: self.transform,
        }
    }
}

/// How logos are arranged inside the container.
#[derive(Debug, Clone)]
pub enum Layout {
    /// One logo, fit to the whole container.
    Single(LogoInput),
    /// Equal-width slots in order; `None` reserves an empty slot.
    Slots(Vec<Option<LogoInput>>),
}

impl Layout {
    /// Resolve every non-empty logo against a `width × height` canvas.
    pub fn placements(
        &self,
        region: &ContainerRegion,
        width: f64,
        height: f64,
    ) -> Vec<(&LogoInput, LogoPlacement)> {
        match self {
            Layout::Single(logo) => {
                let spec = logo.spec();
                let placed = resolve_logo_rect(
                    region,
                    width,
                    height,
                    spec.width,
                    spec.height,
                    &logo.transform,
                );
                vec![(logo, placed)]
            }
            Layout::Slots(slots) => {
                let specs: Vec<Option<LogoSpec>> = slots
                    .iter()
                    .map(|slot| slot.as_ref().map(LogoInput::spec))
                    .collect();
                slots
                    .iter()
                    .zip(resolve_slot_rects(region, width, height, &specs))
                    .filter_map(|(slot, placed)| Some((slot.as_ref()?, placed?)))
                    .collect()
            }
        }
    }
}

/// Draw the full poster into `surface`, replacing its contents.
///
/// `surface` must already have the output size; everything is resolved
/// against it.
pub fn composite(
    surface: &mut RgbaImage,
    base: &RgbaImage,
    region: &ContainerRegion,
    layout: &Layout,
    plate: &BackgroundPlate,
    pixel_scale: f64,
) {
    let (width, height) = surface.dimensions();
    draw_base(surface, base);

    let placements: Vec<_> = layout
        .placements(region, width as f64, height as f64)
        .into_iter()
        .filter(|(_, placed)| {
            if !placed.is_drawable() {
                trace!(?placed, "skipping zero-area logo");
            }
            placed.is_drawable()
        })
        .collect();

    if plate.enabled {
        let bounds = union_rect(placements.iter().map(|(_, placed)| placed.rect));
        if let Some(bounds) = bounds {
            let rect = plate_rect(bounds, plate);
            fill_rounded_rect(
                surface,
                rect,
                plate.corner_radius_px * pixel_scale,
                Color::WHITE,
            );
        }
    }

    for (logo, placed) in &placements {
        draw_logo(surface, logo, placed, pixel_scale);
        if logo.transform.border_width_px > 0.0 {
            stroke_logo_border(surface, logo, placed, pixel_scale);
        }
    }
}

/// Stretch `base` over the whole surface, no aspect correction.
fn draw_base(surface: &mut RgbaImage, base: &RgbaImage) {
    let (width, height) = surface.dimensions();
    if base.width() == 0 || base.height() == 0 {
        surface.pixels_mut().for_each(|px| *px = Rgba([0, 0, 0, 0]));
        return;
    }
    *surface = if base.dimensions() == (width, height) {
        base.clone()
    } else {
        imageops::resize(base, width, height, FilterType::Triangle)
    };
}

/// Logo-local → device transform: translate to center, rotate, scale.
///
/// In logo-local space the natural-size image spans `[-w/2, w/2] × [-h/2, h/2]`.
fn logo_affine(placed: &LogoPlacement, transform: &LogoTransform) -> Affine {
    let (cx, cy) = placed.rect.center();
    Affine::translate(Vec2::new(cx, cy))
        * Affine::rotate(transform.rotation_degrees.to_radians())
        * Affine::scale(placed.scale)
}

fn logo_local_rect(logo: &RgbaImage) -> kurbo::Rect {
    let (w, h) = (logo.width() as f64, logo.height() as f64);
    kurbo::Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
}

/// Integer pixel range of `bounds` clipped to the surface.
fn pixel_span(bounds: kurbo::Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = bounds.x0.floor().max(0.0);
    let y0 = bounds.y0.floor().max(0.0);
    let x1 = bounds.x1.ceil().min(width as f64);
    let y1 = bounds.y1.ceil().min(height as f64);
    if !(x0 < x1 && y0 < y1) {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

fn fill_rounded_rect(surface: &mut RgbaImage, rect: Rect, radius: f64, color: Color) {
    let shape = rounded_rect(rect.to_kurbo(), radius);
    let (width, height) = surface.dimensions();
    let Some((x0, y0, x1, y1)) = pixel_span(shape.bounding_box(), width, height) else {
        return;
    };
    let src = [color.r, color.g, color.b];
    let alpha = color.a as f32 / 255.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let cov = coverage(x as f64, y as f64, |p| shape.contains(p));
            if cov > 0.0 {
                blend_pixel(surface.get_pixel_mut(x, y), src, alpha * cov, BlendMode::SourceOver);
            }
        }
    }
}

fn draw_logo(surface: &mut RgbaImage, logo: &LogoInput, placed: &LogoPlacement, pixel_scale: f64) {
    let t = &logo.transform;
    let opacity = t.alpha();
    if opacity <= 0.0 {
        return;
    }

    let affine = logo_affine(placed, t);
    let inverse = affine.inverse();
    let local = logo_local_rect(&logo.image);
    let clip = rounded_rect(local, t.corner_radius_px * pixel_scale / placed.scale);

    let (width, height) = surface.dimensions();
    let Some((x0, y0, x1, y1)) = pixel_span(affine.transform_rect_bbox(local), width, height)
    else {
        return;
    };

    let half = Vec2::new(local.width() / 2.0, local.height() / 2.0);
    for y in y0..y1 {
        for x in x0..x1 {
            let cov = coverage(x as f64, y as f64, |p| clip.contains(inverse * p));
            if cov <= 0.0 {
                continue;
            }
            let at = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5) + half;
            let [r, g, b, a] = sample_bilinear(&logo.image, at.x, at.y);
            let alpha = a as f32 / 255.0 * opacity * cov;
            if alpha > 0.0 {
                blend_pixel(surface.get_pixel_mut(x, y), [r, g, b], alpha, t.blend_mode);
            }
        }
    }
}

fn stroke_logo_border(
    surface: &mut RgbaImage,
    logo: &LogoInput,
    placed: &LogoPlacement,
    pixel_scale: f64,
) {
    let t = &logo.transform;
    let affine = logo_affine(placed, t);
    let inverse = affine.inverse();
    let local = logo_local_rect(&logo.image);
    let stroke = StrokeOutline::new(
        local,
        t.corner_radius_px * pixel_scale / placed.scale,
        t.border_width_px * pixel_scale / placed.scale,
    );

    let (width, height) = surface.dimensions();
    let Some((x0, y0, x1, y1)) =
        pixel_span(affine.transform_rect_bbox(stroke.bounding_box()), width, height)
    else {
        return;
    };

    let color = t.border_color;
    let src = [color.r, color.g, color.b];
    let alpha = color.a as f32 / 255.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let cov = coverage(x as f64, y as f64, |p| stroke.contains(inverse * p));
            if cov > 0.0 {
                blend_pixel(surface.get_pixel_mut(x, y), src, alpha * cov, BlendMode::SourceOver);
            }
        }
    }
}

/// Bilinear sample at continuous image coordinates (pixel centers at `i + 0.5`),
/// interpolated in premultiplied space, edges clamped.
fn sample_bilinear(img: &RgbaImage, u: f64, v: f64) -> [u8; 4] {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return [0; 4];
    }
    let fx = (u - 0.5).clamp(0.0, (w - 1) as f64);
    let fy = (v - 0.5).clamp(0.0, (h - 1) as f64);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = (fx - x0 as f64) as f32;
    let ty = (fy - y0 as f64) as f32;

    let weights = [
        ((x0, y0), (1.0 - tx) * (1.0 - ty)),
        ((x1, y0), tx * (1.0 - ty)),
        ((x0, y1), (1.0 - tx) * ty),
        ((x1, y1), tx * ty),
    ];

    let mut acc = [0.0f32; 4];
    for ((x, y), wgt) in weights {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let a = a as f32 / 255.0;
        acc[0] += r as f32 * a * wgt;
        acc[1] += g as f32 * a * wgt;
        acc[2] += b as f32 * a * wgt;
        acc[3] += a * wgt;
    }

    if acc[3] <= 0.0 {
        return [0; 4];
    }
    let unpremul = |c: f32| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
    [
        unpremul(acc[0]),
        unpremul(acc[1]),
        unpremul(acc[2]),
        (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Separable blend function `B(backdrop, source)` on 0..1 channels.
fn blend_channel(mode: BlendMode, s: f32, d: f32) -> f32 {
    match mode {
        BlendMode::SourceOver => s,
        BlendMode::Multiply => s * d,
        BlendMode::Screen => s + d - s * d,
        BlendMode::Overlay => {
            if d <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }
        BlendMode::Darken => s.min(d),
        BlendMode::Lighten => s.max(d),
        BlendMode::ColorDodge => {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }
        BlendMode::HardLight => {
            if s <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }
        BlendMode::SoftLight => {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }
        BlendMode::Difference => (d - s).abs(),
        BlendMode::Exclusion => d + s - 2.0 * d * s,
    }
}

/// Composite one straight-alpha source color onto a destination pixel.
///
/// The blended color is mixed with the source by backdrop alpha
/// (`Cs' = (1 - αb)·Cs + αb·B(Cb, Cs)`), then composited source-over.
fn blend_pixel(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f32, mode: BlendMode) {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }

    for c in 0..3 {
        let cs = src[c] as f32 / 255.0;
        let cb = dst[c] as f32 / 255.0;
        let mixed = (1.0 - da) * cs + da * blend_channel(mode, cs, cb).clamp(0.0, 1.0);
        let co = (sa * mixed + da * (1.0 - sa) * cb) / out_a;
        dst[c] = (co * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn solid(width: u32, height: u32, px: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, px)
    }

    /// Whole-canvas region so logo geometry is easy to reason about.
    fn full_region() -> ContainerRegion {
        ContainerRegion::new(0.0, 1.0, 0.0)
    }

    fn surface(width: u32, height: u32) -> RgbaImage {
        RgbaImage::new(width, height)
    }

    // =========================================================================
    // blend math
    // =========================================================================

    #[test]
    fn source_over_opaque_replaces() {
        let mut px = GRAY;
        blend_pixel(&mut px, [255, 0, 0], 1.0, BlendMode::SourceOver);
        assert_eq!(px, RED);
    }

    #[test]
    fn zero_alpha_is_noop() {
        let mut px = GRAY;
        blend_pixel(&mut px, [255, 0, 0], 0.0, BlendMode::Multiply);
        assert_eq!(px, GRAY);
    }

    #[test]
    fn half_alpha_mixes() {
        let mut px = Rgba([0, 0, 0, 255]);
        blend_pixel(&mut px, [255, 255, 255], 0.5, BlendMode::SourceOver);
        assert_eq!(px, Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn multiply_white_keeps_backdrop() {
        let mut px = GRAY;
        blend_pixel(&mut px, [255, 255, 255], 1.0, BlendMode::Multiply);
        assert_eq!(px, GRAY);
    }

    #[test]
    fn screen_black_keeps_backdrop() {
        let mut px = GRAY;
        blend_pixel(&mut px, [0, 0, 0], 1.0, BlendMode::Screen);
        assert_eq!(px, GRAY);
    }

    #[test]
    fn blend_over_transparent_backdrop_is_plain_source() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend_pixel(&mut px, [200, 100, 50], 1.0, BlendMode::Multiply);
        assert_eq!(px, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn difference_of_equal_colors_is_black() {
        assert_eq!(blend_channel(BlendMode::Difference, 0.4, 0.4), 0.0);
        assert_eq!(blend_channel(BlendMode::Exclusion, 0.0, 0.3), 0.3);
        assert_eq!(blend_channel(BlendMode::Darken, 0.2, 0.7), 0.2);
        assert_eq!(blend_channel(BlendMode::Lighten, 0.2, 0.7), 0.7);
    }

    #[test]
    fn bilinear_sample_at_pixel_center_is_exact() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });
        assert_eq!(sample_bilinear(&img, 0.5, 0.5), [0, 0, 0, 255]);
        assert_eq!(sample_bilinear(&img, 1.5, 0.5), [200, 200, 200, 255]);
        assert_eq!(sample_bilinear(&img, 1.0, 0.5), [100, 100, 100, 255]);
    }

    #[test]
    fn bilinear_ignores_color_of_transparent_neighbours() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([255, 255, 255, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let [r, _, _, a] = sample_bilinear(&img, 1.0, 0.5);
        assert_eq!(r, 0);
        assert_eq!(a, 128);
    }

    // =========================================================================
    // composite
    // =========================================================================

    #[test]
    fn base_is_stretched_to_surface() {
        let mut out = surface(40, 10);
        let base = solid(4, 4, GRAY);
        let layout = Layout::Slots(vec![None]);
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert_eq!(out.dimensions(), (40, 10));
        assert!(out.pixels().all(|px| *px == GRAY));
    }

    #[test]
    fn single_logo_covers_its_rect() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        // Logo spans 25..75 on both axes
        assert_eq!(*out.get_pixel(50, 50), RED);
        assert_eq!(*out.get_pixel(26, 26), RED);
        assert_eq!(*out.get_pixel(10, 50), GRAY);
        assert_eq!(*out.get_pixel(80, 50), GRAY);
    }

    #[test]
    fn opacity_fades_logo() {
        let mut out = surface(10, 10);
        let base = solid(10, 10, Rgba([0, 0, 0, 255]));
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, Rgba([255, 255, 255, 255])),
            LogoTransform {
                opacity_percent: 50.0,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert_eq!(*out.get_pixel(5, 5), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn rotation_by_90_keeps_square_logo_in_place() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                rotation_degrees: 90.0,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert_eq!(*out.get_pixel(30, 30), RED);
        assert_eq!(*out.get_pixel(20, 20), GRAY);
    }

    #[test]
    fn rotation_by_45_uncovers_corners() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                rotation_degrees: 45.0,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert_eq!(*out.get_pixel(50, 50), RED);
        // Unrotated corner (26, 26) falls outside the diamond
        assert_eq!(*out.get_pixel(26, 26), GRAY);
        // Diamond tip reaches past the unrotated edge
        assert_eq!(*out.get_pixel(50, 22), RED);
    }

    #[test]
    fn corner_radius_clips_logo_corners() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                corner_radius_px: 40.0,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert_eq!(*out.get_pixel(1, 1), GRAY);
        assert_eq!(*out.get_pixel(50, 1), RED);
    }

    #[test]
    fn border_is_drawn_on_outline() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let blue = Color::rgb(0, 0, 255);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                border_width_px: 4.0,
                border_color: blue,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        // Stroke is centered on x = 25, spanning 23..27
        assert_eq!(*out.get_pixel(24, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(25, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(50, 50), RED);
        assert_eq!(*out.get_pixel(20, 50), GRAY);
    }

    #[test]
    fn border_width_follows_pixel_scale() {
        let blue = Color::rgb(0, 0, 255);
        let logo = LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                border_width_px: 2.0,
                border_color: blue,
                ..LogoTransform::default()
            },
        );
        let layout = Layout::Single(logo);
        let mut out = surface(100, 100);
        composite(
            &mut out,
            &solid(100, 100, GRAY),
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            2.0,
        );
        // 2px at scale 2 → 4px stroke spanning 23..27
        assert_eq!(*out.get_pixel(23, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(26, 50), Rgba([0, 0, 255, 255]));
        assert_eq!(*out.get_pixel(21, 50), GRAY);
    }

    #[test]
    fn corner_radius_follows_pixel_scale() {
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                corner_radius_px: 20.0,
                ..LogoTransform::default()
            },
        ));
        let draw = |scale: f64| {
            let mut out = surface(100, 100);
            composite(
                &mut out,
                &solid(100, 100, GRAY),
                &full_region(),
                &layout,
                &BackgroundPlate::default(),
                scale,
            );
            out
        };
        // (10, 10) is inside a 20px corner but outside a 40px one
        assert_eq!(*draw(1.0).get_pixel(10, 10), RED);
        assert_eq!(*draw(2.0).get_pixel(10, 10), GRAY);
        assert_eq!(*draw(2.0).get_pixel(50, 1), RED);
    }

    #[test]
    fn plate_radius_follows_pixel_scale() {
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                ..LogoTransform::default()
            },
        ));
        let plate = BackgroundPlate {
            enabled: true,
            horizontal_padding_percent: 20.0,
            vertical_padding_percent: 20.0,
            corner_radius_px: 10.0,
        };
        let draw = |scale: f64| {
            let mut out = surface(100, 100);
            composite(
                &mut out,
                &solid(100, 100, GRAY),
                &full_region(),
                &layout,
                &plate,
                scale,
            );
            out
        };
        let white = Rgba([255, 255, 255, 255]);
        // Plate spans 15..85; (18, 18) clears a 10px corner, not a 20px one
        assert_eq!(*draw(1.0).get_pixel(18, 18), white);
        assert_eq!(*draw(2.0).get_pixel(18, 18), GRAY);
        assert_eq!(*draw(2.0).get_pixel(18, 50), white);
    }

    #[test]
    fn plate_is_drawn_behind_logo() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                ..LogoTransform::default()
            },
        ));
        let plate = BackgroundPlate {
            enabled: true,
            horizontal_padding_percent: 20.0,
            vertical_padding_percent: 20.0,
            corner_radius_px: 0.0,
        };
        composite(&mut out, &base, &full_region(), &layout, &plate, 1.0);
        // Plate spans 15..85
        assert_eq!(*out.get_pixel(18, 50), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(50, 50), RED);
        assert_eq!(*out.get_pixel(10, 50), GRAY);
    }

    #[test]
    fn disabled_plate_is_not_drawn() {
        let mut out = surface(100, 100);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                zoom_percent: 50.0,
                ..LogoTransform::default()
            },
        ));
        let plate = BackgroundPlate {
            enabled: false,
            horizontal_padding_percent: 20.0,
            vertical_padding_percent: 20.0,
            corner_radius_px: 0.0,
        };
        composite(&mut out, &solid(100, 100, GRAY), &full_region(), &layout, &plate, 1.0);
        assert_eq!(*out.get_pixel(18, 50), GRAY);
    }

    #[test]
    fn blend_mode_applies_to_logo_only() {
        let mut out = surface(100, 100);
        let base = solid(100, 100, GRAY);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, Rgba([255, 255, 255, 255])),
            LogoTransform {
                zoom_percent: 50.0,
                blend_mode: BlendMode::Multiply,
                ..LogoTransform::default()
            },
        ));
        let plate = BackgroundPlate {
            enabled: true,
            horizontal_padding_percent: 20.0,
            vertical_padding_percent: 20.0,
            corner_radius_px: 0.0,
        };
        composite(&mut out, &base, &full_region(), &layout, &plate, 1.0);
        // White plate drawn normally, white logo multiplied onto it stays white
        assert_eq!(*out.get_pixel(18, 50), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(50, 50), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn slots_draw_in_their_own_columns() {
        let mut out = surface(300, 100);
        let base = solid(300, 100, GRAY);
        let blue = Rgba([0, 0, 255, 255]);
        let layout = Layout::Slots(vec![
            Some(LogoInput::new(solid(10, 10, RED), LogoTransform::default())),
            None,
            Some(LogoInput::new(solid(10, 10, blue), LogoTransform::default())),
        ]);
        composite(
            &mut out,
            &base,
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert_eq!(*out.get_pixel(50, 50), RED);
        assert_eq!(*out.get_pixel(150, 50), GRAY);
        assert_eq!(*out.get_pixel(250, 50), blue);
        // 15% slot margin stays empty
        assert_eq!(*out.get_pixel(3, 50), GRAY);
    }

    #[test]
    fn slots_share_one_plate() {
        let mut out = surface(300, 100);
        let base = solid(300, 100, GRAY);
        let layout = Layout::Slots(vec![
            Some(LogoInput::new(solid(10, 10, RED), LogoTransform::default())),
            None,
            Some(LogoInput::new(solid(10, 10, RED), LogoTransform::default())),
        ]);
        let plate = BackgroundPlate {
            enabled: true,
            horizontal_padding_percent: 0.0,
            vertical_padding_percent: 0.0,
            corner_radius_px: 0.0,
        };
        composite(&mut out, &base, &full_region(), &layout, &plate, 1.0);
        // Empty middle slot sits inside the union plate
        assert_eq!(*out.get_pixel(150, 50), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn logo_outside_surface_is_skipped() {
        let mut out = surface(50, 50);
        let layout = Layout::Single(LogoInput::new(
            solid(10, 10, RED),
            LogoTransform {
                horizontal_offset_percent: 500.0,
                ..LogoTransform::default()
            },
        ));
        composite(
            &mut out,
            &solid(50, 50, GRAY),
            &full_region(),
            &layout,
            &BackgroundPlate::default(),
            1.0,
        );
        assert!(out.pixels().all(|px| *px == GRAY));
    }
}
