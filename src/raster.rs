//! Glyph rasterization onto RGBA buffers.
//!
//! Drawing text is delegated through [`GlyphRasterizer`], so the watermark
//! pipeline never depends on a particular font engine. [`AbGlyphRasterizer`]
//! is the default implementation, backed by `ab_glyph`.
//!
//! Glyph coverage is composited with the standard "over" operator:
//! `out = a * color + (1 - a) * dst` where `a = coverage * color.alpha`.

use ab_glyph::{point, Font, FontRef, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::config::{Color, DPI};
use crate::error::Result;
use crate::placement::Origin;

/// Size and color of the text to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Text size in points.
    pub size_pt: f32,
    /// Text color.
    pub color: Color,
}

/// Draws a single line of text onto a pixel buffer.
pub trait GlyphRasterizer {
    /// Draw `text` into `dst` with its baseline starting at `origin`.
    ///
    /// Pixels outside `dst` are clipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `font` cannot be used to draw glyphs.
    fn draw_text(
        &self,
        dst: &mut RgbaImage,
        font: &[u8],
        style: TextStyle,
        origin: Origin,
        text: &str,
    ) -> Result<()>;
}

/// Default rasterizer backed by `ab_glyph` outlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbGlyphRasterizer;

impl AbGlyphRasterizer {
    /// Create the rasterizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Scale at which the font's em square spans `size_pt` points at [`DPI`].
fn em_scale(font: &FontRef<'_>, size_pt: f32) -> PxScale {
    let em_px = size_pt * DPI / 72.0;
    font.pt_to_px_scale(em_px).unwrap_or_else(|| PxScale::from(em_px))
}

impl GlyphRasterizer for AbGlyphRasterizer {
    fn draw_text(
        &self,
        dst: &mut RgbaImage,
        font: &[u8],
        style: TextStyle,
        origin: Origin,
        text: &str,
    ) -> Result<()> {
        let font = FontRef::try_from_slice(font)?;
        let scale = em_scale(&font, style.size_pt);
        let scaled = font.as_scaled(scale);

        #[allow(clippy::cast_precision_loss)]
        let (mut cursor_x, baseline) = (origin.x as f32, origin.y as f32);
        let mut prev: Option<ab_glyph::GlyphId> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                cursor_x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(cursor_x, baseline));

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                #[allow(clippy::cast_possible_truncation)]
                let (min_x, min_y) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|px, py, coverage| {
                    let x = i64::from(min_x) + i64::from(px);
                    let y = i64::from(min_y) + i64::from(py);
                    blend_at(dst, x, y, style.color, coverage);
                });
            }

            cursor_x += scaled.h_advance(id);
            prev = Some(id);
        }
        Ok(())
    }
}

/// Composite `color` at `(x, y)` with the given coverage, clipping to `dst`.
fn blend_at(dst: &mut RgbaImage, x: i64, y: i64, color: Color, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= dst.width() || y >= dst.height() {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0) * f32::from(color.a) / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let px = dst.get_pixel_mut(x, y);
    *px = over(*px, color, alpha);
}

/// Source-over for a non-premultiplied destination pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn over(bottom: Rgba<u8>, top: Color, top_alpha: f32) -> Rgba<u8> {
    let bottom_alpha = f32::from(bottom[3]) / 255.0;
    let out_alpha = top_alpha + bottom_alpha * (1.0 - top_alpha);
    if out_alpha <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |t: u8, b: u8| -> u8 {
        let v = (f32::from(t) * top_alpha + f32::from(b) * bottom_alpha * (1.0 - top_alpha))
            / out_alpha;
        v.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(top.r, bottom[0]),
        blend(top.g, bottom[1]),
        blend(top.b, bottom[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
