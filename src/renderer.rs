//! CPU rasterizer for the drawing surface.
//!
//! Strokes are drawn as chains of capsules (segments with round caps) onto an
//! RGBA8 target. The same code path feeds the on-screen canvas texture and the
//! exported PNG, so what the user sees is what gets saved.

use std::sync::Arc;

use egui::{Color32, ColorImage, Pos2, Rect, pos2};
use image::{Rgba, RgbaImage, imageops};

use crate::error::RenderError;
use crate::geometry::{calculate_bounds, distance_to_line_segment};
use crate::stroke::{MutableStroke, StrokeRef};

/// Width of the anti-aliasing ramp at a stroke's edge, in pixels
const AA_WIDTH: f32 = 1.0;

/// Fixed-size raster that strokes are rendered into.
///
/// Keeps the last image background scaled to its size, so re-rendering onto
/// the same target only resamples the image when the image itself changes.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    image: RgbaImage,
    pixels_per_point: f32,
    cover: Option<CoverCache>,
}

#[derive(Debug, Clone)]
struct CoverCache {
    source: Arc<RgbaImage>,
    scaled: RgbaImage,
}

impl RenderTarget {
    /// Allocate a transparent `width` x `height` target.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        let alloc_err = || RenderError::Allocation { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(alloc_err)?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|_| alloc_err())?;
        buffer.resize(len, 0);

        let image = RgbaImage::from_raw(width, height, buffer).ok_or_else(alloc_err)?;
        Ok(Self {
            image,
            pixels_per_point: 1.0,
            cover: None,
        })
    }

    /// Scale factor from surface points to target pixels. Ignored unless positive and finite.
    pub fn with_pixels_per_point(mut self, pixels_per_point: f32) -> Self {
        if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            self.pixels_per_point = pixels_per_point;
        }
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Copy the pixels into an egui image for texture upload
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.image.as_raw(),
        )
    }

    fn bounds(&self) -> Rect {
        Rect::from_min_max(
            Pos2::ZERO,
            pos2(self.width() as f32, self.height() as f32),
        )
    }
}

/// Base layer drawn beneath all strokes
#[derive(Debug, Clone)]
pub enum Background {
    Solid(Color32),
    Image(Arc<RgbaImage>),
}

impl Default for Background {
    fn default() -> Self {
        Self::Solid(Color32::WHITE)
    }
}

impl PartialEq for Background {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Solid(a), Self::Solid(b)) => a == b,
            (Self::Image(a), Self::Image(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Render the background, then every completed stroke in order, then the
/// in-progress stroke on top. Identical inputs always give identical pixels.
pub fn render_strokes(
    target: &mut RenderTarget,
    strokes: &[StrokeRef],
    in_progress: Option<&MutableStroke>,
    background: &Background,
) {
    fill_background(target, background);

    for stroke in strokes {
        draw_stroke(target, stroke.points(), stroke.color(), stroke.thickness());
    }

    if let Some(stroke) = in_progress {
        draw_stroke(target, stroke.points(), stroke.color(), stroke.thickness());
    }
}

fn fill_background(target: &mut RenderTarget, background: &Background) {
    for pixel in target.image.pixels_mut() {
        *pixel = Rgba([255, 255, 255, 255]);
    }

    match background {
        Background::Solid(color) => {
            target.cover = None;
            let [r, g, b, a] = color.to_srgba_unmultiplied();
            let alpha = a as f32 / 255.0;
            for pixel in target.image.pixels_mut() {
                blend_over(pixel, [r, g, b], alpha);
            }
        }
        Background::Image(source) => {
            let cached = matches!(&target.cover, Some(cover) if Arc::ptr_eq(&cover.source, source));
            if !cached {
                log::debug!(
                    "Scaling {}x{} background to {}x{}",
                    source.width(),
                    source.height(),
                    target.width(),
                    target.height()
                );
                target.cover = Some(CoverCache {
                    source: source.clone(),
                    scaled: scale_to_cover(source, target.width(), target.height()),
                });
            }

            let RenderTarget { image, cover, .. } = target;
            if let Some(cover) = cover {
                for (dst, src) in image.pixels_mut().zip(cover.scaled.pixels()) {
                    blend_over(dst, [src[0], src[1], src[2]], src[3] as f32 / 255.0);
                }
            }
        }
    }
}

/// Scale `source` so it covers `width` x `height`, keeping its aspect ratio,
/// and crop the overflow evenly from both sides.
///
/// The crop happens in source space first, so no intermediate image is ever
/// larger than the source or the target.
fn scale_to_cover(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = source.dimensions();
    let scale = (width as f64 / src_w as f64).max(height as f64 / src_h as f64);
    let crop_w = ((width as f64 / scale).round() as u32).clamp(1, src_w);
    let crop_h = ((height as f64 / scale).round() as u32).clamp(1, src_h);
    let x = (src_w - crop_w) / 2;
    let y = (src_h - crop_h) / 2;

    let cropped = imageops::crop_imm(source, x, y, crop_w, crop_h).to_image();
    if crop_w == width && crop_h == height {
        return cropped;
    }
    imageops::resize(&cropped, width, height, imageops::FilterType::Triangle)
}

/// Rasterize one stroke. Coverage is accumulated per stroke as the maximum over
/// its capsules, then composited once, so joins are never blended twice.
fn draw_stroke(target: &mut RenderTarget, points: &[Pos2], color: Color32, thickness: f32) {
    if points.is_empty() || thickness <= 0.0 {
        return;
    }

    let ppp = target.pixels_per_point;
    let radius = thickness * ppp * 0.5;
    let points: Vec<Pos2> = points.iter().map(|p| pos2(p.x * ppp, p.y * ppp)).collect();

    let area = calculate_bounds(&points, radius + AA_WIDTH).intersect(target.bounds());
    if !area.is_positive() {
        return;
    }

    let x0 = area.min.x.floor() as u32;
    let y0 = area.min.y.floor() as u32;
    let x1 = (area.max.x.ceil() as u32).min(target.width());
    let y1 = (area.max.y.ceil() as u32).min(target.height());
    let span = (x1 - x0) as usize;
    let mut coverage = vec![0.0f32; span * (y1 - y0) as usize];

    let mut stamp = |a: Pos2, b: Pos2| {
        let seg = calculate_bounds(&[a, b], radius + AA_WIDTH).intersect(area);
        if !seg.is_positive() {
            return;
        }
        let sx0 = (seg.min.x.floor() as u32).max(x0);
        let sy0 = (seg.min.y.floor() as u32).max(y0);
        let sx1 = (seg.max.x.ceil() as u32).min(x1);
        let sy1 = (seg.max.y.ceil() as u32).min(y1);

        for y in sy0..sy1 {
            for x in sx0..sx1 {
                let center = pos2(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_line_segment(center, a, b);
                let cov = ((radius + AA_WIDTH * 0.5 - distance) / AA_WIDTH).clamp(0.0, 1.0);
                let slot = &mut coverage[(y - y0) as usize * span + (x - x0) as usize];
                if cov > *slot {
                    *slot = cov;
                }
            }
        }
    };

    if points.len() == 1 {
        stamp(points[0], points[0]);
    } else {
        for pair in points.windows(2) {
            stamp(pair[0], pair[1]);
        }
    }

    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let alpha = a as f32 / 255.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let cov = coverage[(y - y0) as usize * span + (x - x0) as usize];
            if cov > 0.0 {
                blend_over(target.image.get_pixel_mut(x, y), [r, g, b], cov * alpha);
            }
        }
    }
}

/// Source-over compositing with straight alpha
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        *dst = Rgba([src[0], src[1], src[2], 255]);
        return;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (src[c] as f32 * alpha + dst[c] as f32 * dst_a * (1.0 - alpha)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}
