//! Stamp positioned, colored text watermarks onto images.
//!
//! PNG and JPEG sources are re-encoded with their own codec (JPEG at maximum
//! quality). Animated GIFs keep their frame count, timing, loop setting and
//! color tables; only the pixels of frames sized like the first frame change.
//!
//! # Quick Start
//!
//! ```no_run
//! use text_watermark::{Color, FontSpec, Margin, Position, Watermark};
//!
//! let written = Watermark::new()
//!     .source("photo.jpg")
//!     .font(FontSpec::new("/usr/share/fonts/DejaVuSans.ttf", 24.0, "sai0556"))
//!     .position(Position::TopLeft)
//!     .margin(Margin::new(20, 20))
//!     .color(Color::new(100, 100, 88, 255))
//!     .to("out/photo.jpg")
//!     .finish()
//!     .expect("watermark failed");
//! println!("wrote {}", written.display());
//! ```
//!
//! # Placement
//!
//! Text is placed from a crude width estimate (characters times a fixed
//! pixel width), not from measured glyph metrics. See [`placement`].
//!
//! # Custom rasterizers
//!
//! Glyph drawing goes through the [`GlyphRasterizer`] trait. The default is
//! [`AbGlyphRasterizer`]; any other implementation can be installed with
//! [`Watermark::rasterizer`].

#![deny(missing_docs)]

pub mod animated;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod fs;
pub mod pixel;
pub mod placement;
pub mod raster;
mod watermark;

pub use config::{
    Color, Defaults, FontSource, FontSpec, Margin, Position, DEFAULT_BASE_NAME,
    GLYPH_WIDTH_ESTIMATE,
};
pub use error::{Error, Result};
pub use format::Kind;
pub use placement::Origin;
pub use raster::{AbGlyphRasterizer, GlyphRasterizer, TextStyle};
pub use watermark::{Watermark, WatermarkSpec};
