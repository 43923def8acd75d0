//! Pixel format normalization.
//!
//! Decoded images arrive in whatever layout their codec produced (RGB, gray,
//! 16-bit, palette indices). The watermarkers only ever draw onto a plain
//! non-premultiplied RGBA8 buffer, and GIF frames are mapped back onto their
//! original color table afterwards.

use std::collections::HashMap;

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Copy every pixel of `img` into a fresh RGBA8 buffer of the same size.
///
/// Each pixel is read and converted individually, so indexed, grayscale and
/// high bit-depth sources all end up with identical RGBA semantics. Values are
/// copied, never blended.
#[must_use]
pub fn normalize(img: &DynamicImage) -> RgbaImage {
    RgbaImage::from_fn(img.width(), img.height(), |x, y| img.get_pixel(x, y))
}

/// Build the RGBA color table for a flat `[r, g, b, r, g, b, ...]` palette.
///
/// The transparent index, if any, becomes `(0, 0, 0, 0)`.
fn palette_colors(palette: &[u8], transparent: Option<u8>) -> Vec<Rgba<u8>> {
    palette
        .chunks_exact(3)
        .enumerate()
        .map(|(i, rgb)| {
            if transparent.is_some_and(|t| usize::from(t) == i) {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([rgb[0], rgb[1], rgb[2], 255])
            }
        })
        .collect()
}

/// Expand palette indices into an RGBA8 buffer.
///
/// Indices past the end of the palette read as transparent black.
///
/// # Panics
///
/// Panics if `indices` holds fewer than `width * height` entries.
#[must_use]
pub fn expand_paletted(
    indices: &[u8],
    width: u32,
    height: u32,
    palette: &[u8],
    transparent: Option<u8>,
) -> RgbaImage {
    let colors = palette_colors(palette, transparent);
    RgbaImage::from_fn(width, height, |x, y| {
        let idx = indices[(y * width + x) as usize];
        colors
            .get(usize::from(idx))
            .copied()
            .unwrap_or(Rgba([0, 0, 0, 0]))
    })
}

/// Squared RGBA distance between two colors.
fn distance(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            d.unsigned_abs() * d.unsigned_abs()
        })
        .sum()
}

/// Map every pixel of `img` to the index of its nearest palette entry.
///
/// Nearest means smallest squared RGBA distance; ties go to the lower index.
/// The transparent entry is compared as `(0, 0, 0, 0)`. An empty palette maps
/// everything to index 0.
#[must_use]
pub fn quantize(img: &RgbaImage, palette: &[u8], transparent: Option<u8>) -> Vec<u8> {
    let colors = palette_colors(palette, transparent);
    let mut cache: HashMap<Rgba<u8>, u8> = HashMap::new();

    img.pixels()
        .map(|&px| {
            *cache.entry(px).or_insert_with(|| {
                let best = colors
                    .iter()
                    .enumerate()
                    .min_by_key(|&(i, &c)| (distance(px, c), i))
                    .map_or(0, |(i, _)| i);
                // GIF color tables hold at most 256 entries
                u8::try_from(best).unwrap_or(u8::MAX)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn normalize_keeps_dimensions_and_copies_rgba_exactly() {
        let mut src = RgbaImage::new(3, 2);
        src.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        src.put_pixel(2, 1, Rgba([200, 100, 50, 0]));
        let out = normalize(&DynamicImage::ImageRgba8(src.clone()));
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out, src);
    }

    #[test]
    fn normalize_expands_grayscale_to_opaque_rgba() {
        let mut src = GrayImage::new(2, 2);
        src.put_pixel(1, 0, Luma([77]));
        let out = normalize(&DynamicImage::ImageLuma8(src));
        assert_eq!(*out.get_pixel(1, 0), Rgba([77, 77, 77, 255]));
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn normalize_adds_opaque_alpha_to_rgb() {
        let mut src = RgbImage::new(1, 1);
        src.put_pixel(0, 0, Rgb([9, 8, 7]));
        let out = normalize(&DynamicImage::ImageRgb8(src));
        assert_eq!(*out.get_pixel(0, 0), Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn expand_paletted_honors_transparent_index() {
        let palette = [255, 0, 0, 0, 255, 0, 0, 0, 255];
        let indices = [0, 1, 2, 1];
        let out = expand_paletted(&indices, 2, 2, &palette, Some(1));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(0, 1), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn expand_paletted_treats_out_of_range_index_as_transparent() {
        let palette = [10, 20, 30];
        let out = expand_paletted(&[5], 1, 1, &palette, None);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn quantize_inverts_expand_for_palette_colors() {
        let palette = [0, 0, 0, 255, 255, 255, 255, 0, 0, 0, 0, 255];
        let indices = [0, 1, 2, 3, 3, 2];
        let rgba = expand_paletted(&indices, 3, 2, &palette, None);
        assert_eq!(quantize(&rgba, &palette, None), indices);
    }

    #[test]
    fn quantize_picks_nearest_entry() {
        let palette = [0, 0, 0, 250, 250, 250];
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([20, 30, 10, 255]));
        img.put_pixel(1, 0, Rgba([200, 210, 240, 255]));
        assert_eq!(quantize(&img, &palette, None), vec![0, 1]);
    }

    #[test]
    fn quantize_maps_clear_pixels_to_transparent_index() {
        let palette = [0, 0, 0, 255, 255, 255, 9, 9, 9];
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        assert_eq!(quantize(&img, &palette, Some(2)), vec![2]);
    }

    #[test]
    fn quantize_with_empty_palette_yields_zero() {
        let img = RgbaImage::new(2, 2);
        assert_eq!(quantize(&img, &[], None), vec![0; 4]);
    }
}
