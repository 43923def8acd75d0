//! Static image watermarking.
//!
//! PNG and JPEG sources are decoded with the codec found by
//! [`format::sniff`](crate::format::sniff), copied into an RGBA buffer, stamped
//! with the [`Overlay`] and written back with the same codec.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, info};

use crate::config::{Color, Margin, Position};
use crate::error::{Error, Result};
use crate::pixel;
use crate::placement;
use crate::raster::{GlyphRasterizer, TextStyle};

/// JPEG quality used when re-encoding.
const JPEG_QUALITY: u8 = 100;

/// Everything needed to stamp text onto one buffer.
#[derive(Debug, Clone)]
pub struct Overlay<'a> {
    /// Raw font file contents.
    pub font: &'a [u8],
    /// Text to draw.
    pub text: &'a str,
    /// Text size in points.
    pub size_pt: f32,
    /// Text color.
    pub color: Color,
    /// Anchor position.
    pub position: Position,
    /// Offsets from the anchored edges.
    pub margin: Margin,
}

impl Overlay<'_> {
    /// Place and draw the text onto `buffer` in place.
    ///
    /// # Errors
    ///
    /// Propagates any rasterizer failure.
    pub fn apply(&self, buffer: &mut RgbaImage, rasterizer: &dyn GlyphRasterizer) -> Result<()> {
        let origin = placement::origin(
            self.position,
            self.margin,
            buffer.dimensions(),
            self.size_pt,
            self.text,
        );
        let style = TextStyle {
            size_pt: self.size_pt,
            color: self.color,
        };
        rasterizer.draw_text(buffer, self.font, style, origin, self.text)
    }
}

/// Open `path` for reading.
pub(crate) fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `path` for writing, truncating any existing file.
pub(crate) fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| Error::Create {
            path: path.to_path_buf(),
            source,
        })
}

/// Flush a buffered writer, reporting failures against `path`.
pub(crate) fn flush(mut writer: BufWriter<File>, path: &Path) -> Result<()> {
    writer.flush().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Watermark a PNG or JPEG file.
///
/// The output uses the same codec as the source regardless of the
/// destination's extension. JPEG output is written at maximum quality.
///
/// # Errors
///
/// Returns [`Error::Open`] or [`Error::Decode`] if the source cannot be read,
/// any rasterizer error, and [`Error::Create`], [`Error::Encode`] or
/// [`Error::Write`] if the output cannot be written.
pub fn watermark_static(
    source: &Path,
    format: ImageFormat,
    destination: &Path,
    overlay: &Overlay<'_>,
    rasterizer: &dyn GlyphRasterizer,
) -> Result<()> {
    let decoded = ImageReader::with_format(BufReader::new(open(source)?), format)
        .decode()
        .map_err(Error::Decode)?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        ?format,
        "decoded static image"
    );

    let mut buffer = pixel::normalize(&decoded);
    drop(decoded);
    overlay.apply(&mut buffer, rasterizer)?;

    save(&buffer, format, destination)?;
    info!(destination = %destination.display(), "watermarked image written");
    Ok(())
}

/// Encode `buffer` with the given codec into `path`.
///
/// # Errors
///
/// Returns [`Error::Create`], [`Error::Encode`] or [`Error::Write`].
pub fn save(buffer: &RgbaImage, format: ImageFormat, path: &Path) -> Result<()> {
    let mut writer = create(path)?;
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            rgb.write_with_encoder(encoder).map_err(Error::Encode)?;
        }
        _ => {
            let encoder = PngEncoder::new(&mut writer);
            buffer.write_with_encoder(encoder).map_err(Error::Encode)?;
        }
    }
    flush(writer, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Origin;
    use image::Rgba;
    use std::cell::RefCell;

    /// Records every call and paints the origin pixel.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(Origin, TextStyle, String, (u32, u32))>>,
    }

    impl GlyphRasterizer for Recorder {
        fn draw_text(
            &self,
            dst: &mut RgbaImage,
            _font: &[u8],
            style: TextStyle,
            origin: Origin,
            text: &str,
        ) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((origin, style, text.to_string(), dst.dimensions()));
            if let (Ok(x), Ok(y)) = (u32::try_from(origin.x), u32::try_from(origin.y)) {
                if x < dst.width() && y < dst.height() {
                    dst.put_pixel(x, y, style.color.to_rgba());
                }
            }
            Ok(())
        }
    }

    fn overlay(position: Position) -> Overlay<'static> {
        Overlay {
            font: b"font",
            text: "hi",
            size_pt: 16.0,
            color: Color::new(20, 20, 100, 255),
            position,
            margin: Margin::new(0, 20),
        }
    }

    #[test]
    fn overlay_passes_computed_origin_and_style() {
        let recorder = Recorder::default();
        let mut buffer = RgbaImage::new(100, 100);
        overlay(Position::Center)
            .apply(&mut buffer, &recorder)
            .unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (origin, style, text, dims) = &calls[0];
        assert_eq!(*origin, Origin { x: 46, y: 40 });
        assert_eq!(style.size_pt, 16.0);
        assert_eq!(style.color, Color::new(20, 20, 100, 255));
        assert_eq!(text, "hi");
        assert_eq!(*dims, (100, 100));
        assert_eq!(*buffer.get_pixel(46, 40), Rgba([20, 20, 100, 255]));
    }

    #[test]
    fn png_round_trip_keeps_dimensions_and_stamp() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("in.png");
        let dst = tmp.path().join("out.png");
        RgbaImage::from_pixel(100, 60, Rgba([255, 255, 255, 255]))
            .save(&src)
            .unwrap();

        watermark_static(
            &src,
            ImageFormat::Png,
            &dst,
            &overlay(Position::Center),
            &Recorder::default(),
        )
        .unwrap();

        let out = image::open(&dst).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (100, 60));
        assert_eq!(*out.get_pixel(46, 20), Rgba([20, 20, 100, 255]));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn jpeg_output_is_jpeg_even_with_png_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("in.jpg");
        let dst = tmp.path().join("out.png");
        image::RgbImage::from_pixel(40, 30, image::Rgb([90, 90, 90]))
            .save(&src)
            .unwrap();

        watermark_static(
            &src,
            ImageFormat::Jpeg,
            &dst,
            &overlay(Position::TopLeft),
            &Recorder::default(),
        )
        .unwrap();

        let bytes = std::fs::read(&dst).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let out = image::load_from_memory(&bytes).unwrap();
        assert_eq!((out.width(), out.height()), (40, 30));
    }

    #[test]
    fn corrupt_source_fails_to_decode() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("broken.png");
        std::fs::write(&src, b"\x89PNG\r\n\x1a\ntruncated").unwrap();
        let dst = tmp.path().join("out.png");

        let err = watermark_static(
            &src,
            ImageFormat::Png,
            &dst,
            &overlay(Position::TopLeft),
            &Recorder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(!dst.exists());
    }
}
