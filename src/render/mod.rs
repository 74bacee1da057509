//! # Rendering Module
//!
//! This module turns text into monochrome bitmaps for graphics fields.
//!
//! ## Modules
//!
//! - [`bitmap`]: 1-bit images, padding and mirroring
//! - [`text`]: TTF rasterization via ab_glyph
//!
//! ## Usage Example
//!
//! ```no_run
//! use etiqueta::render::text::{GlyphSource, rasterize};
//!
//! let font = GlyphSource::load(r"C:\Windows\Fonts\calibrib.ttf")?;
//! let (bitmap, _bbox) = rasterize("PBS12345", &font, 29.0)?;
//!
//! // Add the label margin before packing
//! let padded = bitmap.padded(10);
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```

pub mod bitmap;
pub mod text;

pub use bitmap::Bitmap;
pub use text::{BoundingBox, GlyphSource, rasterize};
