//! TTF text rasterization for label fields.
//!
//! Renders text to a 1-bit [`Bitmap`] using ab_glyph. Glyph sources are
//! loaded from disk at runtime because the label font (Calibri Bold) only
//! ships with Windows; a missing or unreadable font is reported as
//! [`EtiquetaError::FontUnavailable`] so callers can fall back to the
//! printer's built-in font.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use std::path::Path;
use tracing::debug;

use crate::error::EtiquetaError;

use super::bitmap::Bitmap;

/// Coverage at or above this value becomes an ink pixel.
const INK_THRESHOLD: f32 = 0.5;

/// A loaded TTF/OTF font.
#[derive(Clone)]
pub struct GlyphSource {
    name: String,
    font: FontArc,
}

impl std::fmt::Debug for GlyphSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphSource").field("name", &self.name).finish()
    }
}

impl GlyphSource {
    /// Load a font file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EtiquetaError> {
        let path = path.as_ref();
        let unavailable = |reason: String| EtiquetaError::FontUnavailable {
            font: path.display().to_string(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| unavailable(e.to_string()))?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| unavailable(e.to_string()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(font = %name, "loaded glyph source");
        Ok(Self { name, font })
    }

    /// Use font data already in memory.
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self, EtiquetaError> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| EtiquetaError::FontUnavailable {
            font: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            font,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scale at which one em is `size` pixels, the way desktop toolkits
    /// interpret a font size.
    fn em_scale(&self, size: f32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / units_per_em)
    }
}

/// Ink bounds of rendered text, in pixels relative to the pen origin at the
/// top of the ascent line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    #[inline]
    pub fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }

    fn union(self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Rasterize `text` at `size` pixels per em.
///
/// The returned bitmap is cropped to the ink bounding box; ink pixels are
/// exactly the glyph coverage at or above 50%.
pub fn rasterize(
    text: &str,
    source: &GlyphSource,
    size: f32,
) -> Result<(Bitmap, BoundingBox), EtiquetaError> {
    if text.is_empty() {
        return Err(EtiquetaError::InvalidInput("cannot rasterize empty text".into()));
    }

    let font = &source.font;
    let scale = source.em_scale(size);
    let scaled = font.as_scaled(scale);
    let baseline_y = scaled.ascent();

    // Layout: pen advances with kerning
    let mut outlines = Vec::new();
    let mut caret_x = 0.0f32;
    let mut previous = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = previous {
            caret_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(caret_x, baseline_y));
        caret_x += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            outlines.push(outlined);
        }
    }

    let bbox = outlines
        .iter()
        .map(|outlined| {
            let bounds = outlined.px_bounds();
            BoundingBox {
                x0: bounds.min.x as i32,
                y0: bounds.min.y as i32,
                x1: bounds.max.x as i32,
                y1: bounds.max.y as i32,
            }
        })
        .reduce(BoundingBox::union)
        .ok_or_else(|| {
            EtiquetaError::InvalidInput(format!("text {:?} has no visible glyphs", text))
        })?;

    let mut bitmap = Bitmap::new(bbox.width(), bbox.height())?;

    for outlined in &outlines {
        let bounds = outlined.px_bounds();
        let offset_x = bounds.min.x as i32 - bbox.x0;
        let offset_y = bounds.min.y as i32 - bbox.y0;

        outlined.draw(|px, py, coverage| {
            if coverage >= INK_THRESHOLD {
                let x = offset_x + px as i32;
                let y = offset_y + py as i32;
                if x >= 0 && y >= 0 {
                    bitmap.set(x as usize, y as usize, true);
                }
            }
        });
    }

    debug!(
        text,
        font = source.name(),
        width = bitmap.width(),
        height = bitmap.height(),
        "rasterized text"
    );

    Ok((bitmap, bbox))
}
