//! The chainable watermark façade.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::animated;
use crate::config::{Color, Defaults, FontSource, FontSpec, Margin, Position, DEFAULT_BASE_NAME};
use crate::engine::{self, Overlay};
use crate::error::{Error, Result};
use crate::format::{self, Kind};
use crate::fs;
use crate::raster::{AbGlyphRasterizer, GlyphRasterizer};

/// A complete, validated description of one watermark job.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    /// Source image.
    pub source: PathBuf,
    /// Output file. `None` writes `save_dir/sai.<ext>`.
    pub destination: Option<PathBuf>,
    /// Directory for the default destination.
    pub save_dir: PathBuf,
    /// Font, size and text.
    pub font: FontSpec,
    /// Anchor position.
    pub position: Position,
    /// Offsets from the anchored edges.
    pub margin: Margin,
    /// Text color.
    pub color: Color,
}

impl WatermarkSpec {
    /// Check the configuration without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontNotConfigured`] for an empty font source, then
    /// [`Error::ColorNotConfigured`] for an all-zero color.
    pub fn validate(&self) -> Result<()> {
        if self.font.source.is_empty() {
            return Err(Error::FontNotConfigured);
        }
        if !self.color.is_configured() {
            return Err(Error::ColorNotConfigured);
        }
        Ok(())
    }

    /// The path the output will be written to for a source of `kind`.
    #[must_use]
    pub fn destination_for(&self, kind: Kind) -> PathBuf {
        self.destination.clone().unwrap_or_else(|| {
            self.save_dir
                .join(format!("{DEFAULT_BASE_NAME}.{}", kind.extension()))
        })
    }

    /// Run the job: sniff, decode, stamp, encode. Returns the written path.
    ///
    /// # Errors
    ///
    /// The first failure of any stage; see [`Error`].
    pub fn execute(&self, rasterizer: &dyn GlyphRasterizer) -> Result<PathBuf> {
        self.validate()?;
        let kind = format::sniff(&self.source)?;
        let destination = self.destination_for(kind);
        debug!(
            source = %self.source.display(),
            destination = %destination.display(),
            ?kind,
            "dispatching watermark job"
        );

        let font = self.font.source.load()?;
        let overlay = Overlay {
            font: &font,
            text: &self.font.text,
            size_pt: self.font.size,
            color: self.color,
            position: self.position,
            margin: self.margin,
        };

        fs::ensure_parent_dir(&destination)?;
        match kind {
            Kind::Animated => {
                animated::watermark_gif(&self.source, &destination, &overlay, rasterizer)?;
            }
            Kind::Static(image_format) => {
                engine::watermark_static(
                    &self.source,
                    image_format,
                    &destination,
                    &overlay,
                    rasterizer,
                )?;
            }
        }
        Ok(destination)
    }
}

/// Chainable watermark builder.
///
/// Setters only record values; nothing touches the filesystem until
/// [`run`](Self::run). Once an error is recorded every later setter and run
/// is a no-op, and the first error is the one reported by
/// [`error`](Self::error).
///
/// ```no_run
/// use text_watermark::{Color, FontSpec, Margin, Position, Watermark};
///
/// let wm = Watermark::new()
///     .source("photo.png")
///     .font(FontSpec::new("DejaVuSans.ttf", 16.0, "hi"))
///     .position(Position::Center)
///     .margin(Margin::new(0, 20))
///     .color(Color::new(20, 20, 100, 255))
///     .run();
/// assert!(wm.error().is_none());
/// ```
pub struct Watermark {
    defaults: Defaults,
    source: PathBuf,
    destination: Option<PathBuf>,
    font: Option<FontSpec>,
    position: Position,
    margin: Margin,
    color: Color,
    rasterizer: Box<dyn GlyphRasterizer>,
    err: Option<Error>,
    output: Option<PathBuf>,
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new()
    }
}

impl Watermark {
    /// Create a builder with [`Defaults::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_defaults(Defaults::default())
    }

    /// Create a builder using the given process-level defaults.
    #[must_use]
    pub fn with_defaults(defaults: Defaults) -> Self {
        Self {
            defaults,
            source: PathBuf::new(),
            destination: None,
            font: None,
            position: Position::default(),
            margin: Margin::default(),
            color: Color::default(),
            rasterizer: Box::new(AbGlyphRasterizer::new()),
            err: None,
            output: None,
        }
    }

    /// Set the source image path.
    #[must_use]
    pub fn source(mut self, path: impl AsRef<Path>) -> Self {
        if self.err.is_none() {
            self.source = path.as_ref().to_path_buf();
        }
        self
    }

    /// Set the font, size and text.
    #[must_use]
    pub fn font(mut self, font: FontSpec) -> Self {
        if self.err.is_none() {
            self.font = Some(font);
        }
        self
    }

    /// Set the anchor position.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        if self.err.is_none() {
            self.position = position;
        }
        self
    }

    /// Set the anchor position from a legacy integer code (`0..=4`).
    ///
    /// An unknown code records [`Error::InvalidPosition`].
    #[must_use]
    pub fn position_code(mut self, code: i32) -> Self {
        if self.err.is_none() {
            match Position::try_from(code) {
                Ok(position) => self.position = position,
                Err(e) => self.err = Some(e),
            }
        }
        self
    }

    /// Set the margin from the anchored edges.
    #[must_use]
    pub fn margin(mut self, margin: Margin) -> Self {
        if self.err.is_none() {
            self.margin = margin;
        }
        self
    }

    /// Set the text color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        if self.err.is_none() {
            self.color = color;
        }
        self
    }

    /// Set the output file. Missing directories are created on run.
    #[must_use]
    pub fn to(mut self, path: impl AsRef<Path>) -> Self {
        if self.err.is_none() {
            self.destination = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replace the glyph rasterizer.
    #[must_use]
    pub fn rasterizer(mut self, rasterizer: impl GlyphRasterizer + 'static) -> Self {
        if self.err.is_none() {
            self.rasterizer = Box::new(rasterizer);
        }
        self
    }

    /// Resolve the builder into a [`WatermarkSpec`].
    ///
    /// An empty font source falls back to the default font path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontNotConfigured`] or [`Error::ColorNotConfigured`].
    pub fn spec(&self) -> Result<WatermarkSpec> {
        let mut font = self.font.clone().ok_or(Error::FontNotConfigured)?;
        if font.source.is_empty() {
            let fallback = self
                .defaults
                .font_path
                .clone()
                .ok_or(Error::FontNotConfigured)?;
            font.source = FontSource::Path(fallback);
        }

        let spec = WatermarkSpec {
            source: self.source.clone(),
            destination: self.destination.clone(),
            save_dir: self.defaults.save_dir.clone(),
            font,
            position: self.position,
            margin: self.margin,
            color: self.color,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Run the job, recording the written path or the error.
    #[must_use]
    pub fn run(mut self) -> Self {
        if self.err.is_some() {
            return self;
        }
        let outcome = self.spec().and_then(|spec| spec.execute(&*self.rasterizer));
        match outcome {
            Ok(path) => self.output = Some(path),
            Err(e) => self.err = Some(e),
        }
        self
    }

    /// The recorded error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// The path written by the last successful run.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Run the job unless it already ran, and return its outcome.
    ///
    /// # Errors
    ///
    /// The recorded error.
    pub fn finish(mut self) -> Result<PathBuf> {
        if let Some(e) = self.err.take() {
            return Err(e);
        }
        if let Some(path) = self.output.take() {
            return Ok(path);
        }
        self.spec()?.execute(&*self.rasterizer)
    }
}
