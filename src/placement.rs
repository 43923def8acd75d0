//! Text origin calculation.
//!
//! The origin is the pen position handed to the rasterizer: `x` is the left
//! edge of the first glyph and `y` is the text baseline. Coordinates are
//! signed and never clamped, so large margins or long text can push the
//! watermark partly or entirely off the canvas. Arithmetic wraps on `i32`
//! overflow instead of panicking; a wrapped origin simply lands off-canvas.
//!
//! ```
//! use text_watermark::placement::{origin, Origin};
//! use text_watermark::{Margin, Position};
//!
//! let o = origin(Position::TopLeft, Margin::new(20, 20), (640, 480), 16.0, "hello");
//! assert_eq!(o, Origin { x: 20, y: 20 + 24 });
//! ```

use crate::config::{Margin, Position, DPI, GLYPH_WIDTH_ESTIMATE};

/// Pen position for the first glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    /// Left edge of the text.
    pub x: i32,
    /// Baseline of the text.
    pub y: i32,
}

/// Whole-pixel ascent used to push top-anchored text below the edge.
///
/// This is the point size converted to pixels at [`DPI`], truncated.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn ascent(size_pt: f32) -> i32 {
    (size_pt * DPI / 72.0).floor() as i32
}

/// Heuristic text width: character count times [`GLYPH_WIDTH_ESTIMATE`].
#[must_use]
pub fn estimate_text_width(text: &str) -> i32 {
    let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    chars.saturating_mul(GLYPH_WIDTH_ESTIMATE)
}

/// Compute the text origin for a buffer of `(width, height)` pixels.
#[must_use]
pub fn origin(
    position: Position,
    margin: Margin,
    (width, height): (u32, u32),
    size_pt: f32,
    text: &str,
) -> Origin {
    let w = i32::try_from(width).unwrap_or(i32::MAX);
    let h = i32::try_from(height).unwrap_or(i32::MAX);
    let text_w = estimate_text_width(text);
    let Margin { dx, dy } = margin;

    let right = w.wrapping_sub(text_w).wrapping_sub(dx);
    let (x, y) = match position {
        Position::TopLeft => (dx, dy.wrapping_add(ascent(size_pt))),
        Position::TopRight => (right, dy.wrapping_add(ascent(size_pt))),
        Position::BottomLeft => (dx, h.wrapping_sub(dy)),
        Position::BottomRight => (right, h.wrapping_sub(dy)),
        Position::Center => (w.wrapping_sub(text_w) / 2, h.wrapping_sub(dy) / 2),
    };
    Origin { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascent_converts_points_at_fixed_dpi() {
        assert_eq!(ascent(16.0), 24);
        assert_eq!(ascent(24.0), 36);
        assert_eq!(ascent(10.0), 15);
        assert_eq!(ascent(0.0), 0);
    }

    #[test]
    fn text_width_counts_characters_not_bytes() {
        assert_eq!(estimate_text_width(""), 0);
        assert_eq!(estimate_text_width("hi"), 8);
        assert_eq!(estimate_text_width("水印"), 8);
    }

    #[test]
    fn top_left_ignores_image_size() {
        let m = Margin::new(20, 30);
        for dims in [(1, 1), (100, 100), (4000, 20)] {
            let o = origin(Position::TopLeft, m, dims, 16.0, "sai0556");
            assert_eq!(o, Origin { x: 20, y: 30 + 24 });
        }
    }

    #[test]
    fn top_right_subtracts_estimate_and_margin() {
        let o = origin(Position::TopRight, Margin::new(5, 7), (200, 100), 16.0, "abc");
        assert_eq!(o, Origin { x: 200 - 12 - 5, y: 7 + 24 });
    }

    #[test]
    fn bottom_positions_use_height_minus_dy() {
        let m = Margin::new(5, 7);
        let bl = origin(Position::BottomLeft, m, (200, 100), 16.0, "abc");
        assert_eq!(bl, Origin { x: 5, y: 93 });
        let br = origin(Position::BottomRight, m, (200, 100), 16.0, "abc");
        assert_eq!(br, Origin { x: 183, y: 93 });
    }

    #[test]
    fn center_halves_remaining_space() {
        let o = origin(Position::Center, Margin::new(0, 20), (100, 100), 16.0, "hi");
        assert_eq!(o, Origin { x: 46, y: 40 });
    }

    #[test]
    fn origins_are_not_clamped() {
        let o = origin(Position::BottomRight, Margin::new(50, 500), (20, 20), 16.0, "long text");
        assert_eq!(o, Origin { x: 20 - 36 - 50, y: 20 - 500 });
        let c = origin(Position::Center, Margin::default(), (2, 2), 16.0, "abc");
        // (2 - 12) / 2 truncates toward zero
        assert_eq!(c.x, -5);
    }

    #[test]
    fn extreme_margins_wrap_instead_of_panicking() {
        let positions = [
            Position::TopLeft,
            Position::TopRight,
            Position::BottomLeft,
            Position::BottomRight,
            Position::Center,
        ];
        let margins = [
            Margin::new(i32::MAX, i32::MAX),
            Margin::new(i32::MIN, i32::MIN),
            Margin::new(i32::MIN, i32::MAX),
            Margin::new(0, i32::MAX - 5),
        ];
        for position in positions {
            for margin in margins {
                for size in [16.0, f32::MAX] {
                    let _ = origin(position, margin, (u32::MAX, u32::MAX), size, "sai0556");
                    let _ = origin(position, margin, (10, 10), size, "");
                }
            }
        }

        let o = origin(Position::TopLeft, Margin::new(0, i32::MAX - 5), (10, 10), 16.0, "hi");
        assert_eq!(o.y, (i32::MAX - 5).wrapping_add(24));
        let o = origin(Position::BottomLeft, Margin::new(0, i32::MIN), (10, 10), 16.0, "hi");
        assert_eq!(o.y, 10i32.wrapping_sub(i32::MIN));
    }
}
