//! Watermark configuration values.
//!
//! Everything a caller hands to the [`Watermark`](crate::Watermark) façade:
//! where the text goes, what color it is, which font draws it, and the
//! process-level [`Defaults`] used when a call leaves something out.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Base file name used when no destination is given (`sai.<ext>`).
pub const DEFAULT_BASE_NAME: &str = "sai";

/// Resolution used to convert point sizes to pixels.
pub const DPI: f32 = 108.0;

/// Assumed width of one character, in pixels.
///
/// Text extent is estimated as `chars * GLYPH_WIDTH_ESTIMATE` rather than
/// measured from glyph metrics. The estimate decides where right-anchored and
/// centered text lands, so changing it moves existing watermarks.
pub const GLYPH_WIDTH_ESTIMATE: i32 = 4;

/// Where the text is anchored on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Anchored to the top-left corner.
    #[default]
    TopLeft,
    /// Anchored to the top-right corner.
    TopRight,
    /// Anchored to the bottom-left corner.
    BottomLeft,
    /// Anchored to the bottom-right corner.
    BottomRight,
    /// Centered.
    Center,
}

impl TryFrom<i32> for Position {
    type Error = Error;

    /// Map the legacy integer codes `0..=4` onto positions.
    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::TopLeft),
            1 => Ok(Self::TopRight),
            2 => Ok(Self::BottomLeft),
            3 => Ok(Self::BottomRight),
            4 => Ok(Self::Center),
            other => Err(Error::InvalidPosition(other.to_string())),
        }
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top-left" | "tl" => Ok(Self::TopLeft),
            "top-right" | "tr" => Ok(Self::TopRight),
            "bottom-left" | "bl" => Ok(Self::BottomLeft),
            "bottom-right" | "br" => Ok(Self::BottomRight),
            "center" | "c" => Ok(Self::Center),
            _ => Err(Error::InvalidPosition(s.to_string())),
        }
    }
}

/// Offsets from the anchored edges, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margin {
    /// Horizontal offset.
    pub dx: i32,
    /// Vertical offset.
    pub dy: i32,
}

impl Margin {
    /// Create a margin.
    #[must_use]
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Non-premultiplied RGBA text color.
///
/// The all-zero value means "not configured" and is rejected at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Create a color from its four channels.
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether at least one channel is non-zero.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.r != 0 || self.g != 0 || self.b != 0 || self.a != 0
    }

    /// The color as an `image` pixel.
    #[must_use]
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `r,g,b[,a]` decimal lists or `#RGB`, `#RRGGBB`, `#RRGGBBAA` hex.
    ///
    /// Alpha defaults to 255 when omitted.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(s.to_string());
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            if !hex.is_ascii() {
                return Err(invalid());
            }
            return match hex.len() {
                3 => {
                    let digit =
                        |i: usize| u8::from_str_radix(&hex[i..=i], 16).map_err(|_| invalid());
                    // #RGB doubles each digit: 0xF -> 0xFF
                    Ok(Self::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255))
                }
                6 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
                8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
                _ => Err(invalid()),
            };
        }

        let channels = s
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<u8>>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b, 255)),
            [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
            _ => Err(invalid()),
        }
    }
}

/// Where the font data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A TrueType/OpenType file on disk.
    Path(PathBuf),
    /// Font file contents already in memory.
    Bytes(Vec<u8>),
}

impl FontSource {
    /// Whether the source points at nothing (empty path or no bytes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Path(path) => path.as_os_str().is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// Read the font data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFont`] if the font file cannot be read.
    pub fn load(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|source| Error::ReadFont {
                    path: path.clone(),
                    source,
                }),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl From<&Path> for FontSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for FontSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for FontSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for FontSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Font, size and text of the watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font data.
    pub source: FontSource,
    /// Text size in points.
    pub size: f32,
    /// Text to draw.
    pub text: String,
}

impl FontSpec {
    /// Create a font spec.
    pub fn new(source: impl Into<FontSource>, size: f32, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            size,
            text: text.into(),
        }
    }
}

/// Process-level defaults, set once at startup and passed to the façade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Directory for outputs when a call gives no destination.
    pub save_dir: PathBuf,
    /// Font file used when a call's font source is empty.
    pub font_path: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("./"),
            font_path: None,
        }
    }
}
