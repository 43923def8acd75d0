//! Source format detection.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::error::{Error, Result};

/// Which watermarker handles a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Single-frame PNG or JPEG.
    Static(ImageFormat),
    /// Animated (or single-frame) GIF.
    Animated,
}

impl Kind {
    /// Extension tag of the format: `png`, `jpeg` or `gif`.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Static(ImageFormat::Jpeg) => "jpeg",
            Self::Static(_) => "png",
            Self::Animated => "gif",
        }
    }
}

/// Detect the format of `path` from its header bytes.
///
/// Only the first bytes are inspected; pixel data is not decoded and the file
/// name plays no part. The file handle is released before returning.
///
/// # Errors
///
/// Returns [`Error::Open`] if the file cannot be opened or read, and
/// [`Error::UnsupportedExtension`] for anything other than PNG, JPEG or GIF.
pub fn sniff(path: &Path) -> Result<Kind> {
    let open_err = |source| Error::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let format = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(open_err)?
        .format();

    match format {
        Some(ImageFormat::Gif) => Ok(Kind::Animated),
        Some(f @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(Kind::Static(f)),
        Some(other) => Err(Error::UnsupportedExtension(
            other
                .extensions_str()
                .first()
                .map_or_else(|| format!("{other:?}").to_lowercase(), |e| (*e).to_string()),
        )),
        None => Err(Error::UnsupportedExtension("unknown".to_string())),
    }
}
