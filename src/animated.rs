//! Animated GIF watermarking.
//!
//! Frames are decoded as palette indices so the output keeps each frame's
//! color table, timing, disposal and offsets. Frames sized like frame 0 are
//! expanded to RGBA, stamped, and mapped back onto their own palette. Frames
//! of any other size pass through untouched.

use std::borrow::Cow;
use std::io::BufReader;
use std::path::Path;

use gif::{ColorOutput, DecodeOptions, Encoder, Frame, Repeat};
use tracing::{debug, info};

use crate::engine::{self, Overlay};
use crate::error::{Error, Result};
use crate::pixel;
use crate::raster::GlyphRasterizer;

/// A fully decoded GIF: screen size, color tables, loop setting and frames.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Logical screen width.
    pub width: u16,
    /// Logical screen height.
    pub height: u16,
    /// Global color table as packed RGB triples, if present.
    pub global_palette: Option<Vec<u8>>,
    /// Loop setting. `Finite(0)` means the file had no loop extension.
    pub repeat: Repeat,
    /// Frames in display order, pixels stored as palette indices.
    pub frames: Vec<Frame<'static>>,
}

impl Animation {
    /// Decode every frame of the GIF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] or [`Error::GifDecode`].
    pub fn read(path: &Path) -> Result<Self> {
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::Indexed);
        let mut decoder = options.read_info(BufReader::new(engine::open(path)?))?;

        let mut frames = Vec::new();
        while let Some(frame) = decoder.read_next_frame()? {
            let mut frame = frame.clone();
            // rows come back deinterlaced
            frame.interlaced = false;
            frames.push(frame);
        }

        Ok(Self {
            width: decoder.width(),
            height: decoder.height(),
            global_palette: decoder.global_palette().map(<[u8]>::to_vec),
            repeat: decoder.repeat(),
            frames,
        })
    }

    /// Encode the animation to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Create`], [`Error::GifEncode`] or [`Error::Write`].
    pub fn write(&self, path: &Path) -> Result<()> {
        let writer = engine::create(path)?;
        let global = self.global_palette.as_deref().unwrap_or(&[]);
        let mut encoder = Encoder::new(writer, self.width, self.height, global)?;
        if self.repeat != Repeat::Finite(0) {
            encoder.set_repeat(self.repeat)?;
        }
        for frame in &self.frames {
            encoder.write_frame(frame)?;
        }
        let writer = encoder.into_inner().map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        engine::flush(writer, path)
    }

    /// Fail if frame 1 is larger than frame 0 in both dimensions.
    ///
    /// Only the first two frames are compared. Later frames with other sizes
    /// are handled by passing them through.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GifBounds`].
    pub fn check_bounds(&self) -> Result<()> {
        if let [first, second, ..] = self.frames.as_slice() {
            if second.width > first.width && second.height > first.height {
                return Err(Error::GifBounds {
                    first: (first.width, first.height),
                    second: (second.width, second.height),
                });
            }
        }
        Ok(())
    }
}

/// Stamp one frame in place, re-quantizing against its own color table.
fn stamp_frame(
    index: usize,
    frame: &mut Frame<'static>,
    global_palette: Option<&[u8]>,
    overlay: &Overlay<'_>,
    rasterizer: &dyn GlyphRasterizer,
) -> Result<()> {
    let palette = frame
        .palette
        .as_deref()
        .or(global_palette)
        .ok_or(Error::MissingPalette { frame: index })?;

    let (width, height) = (u32::from(frame.width), u32::from(frame.height));
    let mut buffer =
        pixel::expand_paletted(&frame.buffer, width, height, palette, frame.transparent);
    overlay.apply(&mut buffer, rasterizer)?;
    let indices = pixel::quantize(&buffer, palette, frame.transparent);
    frame.buffer = Cow::Owned(indices);
    Ok(())
}

/// Stamp every eligible frame of `animation`.
///
/// A frame is eligible when its size equals frame 0's. The first rasterizer
/// error aborts the whole animation.
///
/// # Errors
///
/// Returns [`Error::GifBounds`], [`Error::MissingPalette`] or any rasterizer
/// error.
pub fn stamp(
    animation: &mut Animation,
    overlay: &Overlay<'_>,
    rasterizer: &dyn GlyphRasterizer,
) -> Result<()> {
    animation.check_bounds()?;
    let Some(reference) = animation.frames.first().map(|f| (f.width, f.height)) else {
        return Ok(());
    };

    let global = animation.global_palette.as_deref();
    for (index, frame) in animation.frames.iter_mut().enumerate() {
        if (frame.width, frame.height) == reference {
            stamp_frame(index, frame, global, overlay, rasterizer)?;
            debug!(frame = index, "stamped frame");
        } else {
            debug!(
                frame = index,
                width = frame.width,
                height = frame.height,
                "frame size differs from frame 0, passing through"
            );
        }
    }
    Ok(())
}

/// Watermark the GIF at `source` and write the result to `destination`.
///
/// Frame count, per-frame delays and the loop setting are preserved.
///
/// # Errors
///
/// Any decode, bounds, rasterizer or encode error. Nothing is written unless
/// every frame was processed.
pub fn watermark_gif(
    source: &Path,
    destination: &Path,
    overlay: &Overlay<'_>,
    rasterizer: &dyn GlyphRasterizer,
) -> Result<()> {
    let mut animation = Animation::read(source)?;
    debug!(
        frames = animation.frames.len(),
        width = animation.width,
        height = animation.height,
        "decoded gif"
    );

    stamp(&mut animation, overlay, rasterizer)?;
    animation.write(destination)?;
    info!(
        destination = %destination.display(),
        frames = animation.frames.len(),
        "watermarked animation written"
    );
    Ok(())
}
