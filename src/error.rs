//! Error types for the text-watermark crate.

use std::path::PathBuf;

/// Errors that can occur while configuring or running a watermark job.
///
/// Each variant names the pipeline stage that failed. Nothing is retried or
/// recovered internally; the first error ends the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No font file or font bytes were configured, and no default font exists.
    #[error("font not configured")]
    FontNotConfigured,

    /// The text color was left at all-zero channels.
    #[error("color not configured")]
    ColorNotConfigured,

    /// A position code or name did not match one of the five positions.
    #[error("invalid watermark position: {0}")]
    InvalidPosition(String),

    /// A textual color could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The sniffed image format is not one of png, jpeg or gif.
    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),

    /// Frame 1 of an animation is larger than frame 0 in both dimensions.
    #[error(
        "gif: image block is out of bounds (frame 0 is {}x{}, frame 1 is {}x{})",
        .first.0, .first.1, .second.0, .second.1
    )]
    GifBounds {
        /// Width and height of frame 0.
        first: (u16, u16),
        /// Width and height of frame 1.
        second: (u16, u16),
    },

    /// The source image could not be opened or sniffed.
    #[error("open file failed: {}: {source}", .path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The destination file could not be created.
    #[error("create file failed: {}: {source}", .path.display())]
    Create {
        /// Path that failed to be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The destination directory could not be created.
    #[error("create directory failed: {}: {source}", .path.display())]
    CreateDir {
        /// Directory that failed to be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The font file could not be read.
    #[error("read font file failed: {}: {source}", .path.display())]
    ReadFont {
        /// Font path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Flushing the encoded output to disk failed.
    #[error("write file failed: {}: {source}", .path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A PNG or JPEG source could not be decoded.
    #[error("decode image file failed: {0}")]
    Decode(#[source] image::ImageError),

    /// A GIF source could not be decoded.
    #[error("decode gif file failed: {0}")]
    GifDecode(#[from] gif::DecodingError),

    /// A GIF frame has neither a local nor a global color table.
    #[error("decode gif file failed: frame {frame} has no color table")]
    MissingPalette {
        /// Index of the offending frame.
        frame: usize,
    },

    /// A PNG or JPEG output could not be encoded.
    #[error("encode image failed: {0}")]
    Encode(#[source] image::ImageError),

    /// A GIF output could not be encoded.
    #[error("encode gif failed: {0}")]
    GifEncode(#[from] gif::EncodingError),

    /// The font data could not be used for rasterization.
    #[error("draw text failed: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
