//! # Serial Number Labels
//!
//! Builds the complete control stream for a one-line serial label.
//!
//! Two renditions exist:
//!
//! | Rendition | Font | Stream |
//! |-----------|------|--------|
//! | Graphics | TTF (Calibri Bold), rasterized here | `^XA^FOx,15^GFA,...^FS^XZ` |
//! | Built-in | Printer font 0 | `^XA^LH0,0^FO0,20^A0N,29,29^FB360,1,0,C,0^FD...^FS^PQ1^XZ` |
//!
//! The graphics rendition needs a glyph source that only exists on some
//! hosts. When it is missing, or rasterization fails, [`LabelRenderer::render`]
//! falls back to the built-in rendition instead of failing the job.

use std::path::Path;
use tracing::{debug, warn};

use crate::error::EtiquetaError;
use crate::printer::LabelConfig;
use crate::render::{GlyphSource, rasterize};

use super::commands::{self, END_FORMAT, FIELD_SEPARATOR, Justify, START_FORMAT};
use super::graphics::GraphicsField;

/// Self-test label sent by `--zpl-test`.
pub const ZPL_TEST_PAYLOAD: &str = "^XA\n^LH0,0\n^FO40,40\n^A0N,36,36\n^FDTeste^FS\n^XZ\n";

/// Default glyph source for graphics labels.
pub const DEFAULT_FONT_PATH: &str = r"C:\Windows\Fonts\calibrib.ttf";

/// Display name reported for [`DEFAULT_FONT_PATH`].
pub const DEFAULT_FONT_NAME: &str = "Calibri Bold";

/// Default text size in pixels per em.
pub const DEFAULT_FONT_SIZE: f32 = 29.0;

/// How rasterized text is drawn.
#[derive(Debug, Clone)]
pub struct TextStyle {
    /// Name reported to relay callers, e.g. "Calibri Bold"
    pub font_name: String,
    /// Pixels per em
    pub size: f32,
    /// Flip left-to-right before packing, for mirrored print heads
    pub mirror: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: DEFAULT_FONT_NAME.to_string(),
            size: DEFAULT_FONT_SIZE,
            mirror: false,
        }
    }
}

/// A finished serial label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialLabel {
    pub zpl: String,
    /// True when the text was rasterized with the TTF font
    pub rasterized: bool,
}

/// Renders serial labels for one label stock and font.
#[derive(Debug, Clone)]
pub struct LabelRenderer {
    font: Option<GlyphSource>,
    style: TextStyle,
    label: LabelConfig,
}

impl LabelRenderer {
    pub fn new(font: Option<GlyphSource>, style: TextStyle, label: LabelConfig) -> Self {
        Self { font, style, label }
    }

    /// Load the glyph source at `font_path`.
    ///
    /// A missing font is not an error: the renderer is still built and will
    /// only produce built-in font labels.
    pub fn load<P: AsRef<Path>>(font_path: P, style: TextStyle, label: LabelConfig) -> Self {
        let font = match GlyphSource::load(font_path) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "rasterized labels disabled, using the printer's built-in font");
                None
            }
        };
        Self::new(font, style, label)
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn label(&self) -> &LabelConfig {
        &self.label
    }

    /// Whether a glyph source is loaded.
    pub fn can_rasterize(&self) -> bool {
        self.font.is_some()
    }

    /// Rasterize `text` into a centered graphics field.
    pub fn graphics(&self, text: &str) -> Result<GraphicsField, EtiquetaError> {
        let font = self.font.as_ref().ok_or_else(|| EtiquetaError::FontUnavailable {
            font: self.style.font_name.clone(),
            reason: "no glyph source loaded".into(),
        })?;

        let (bitmap, _) = rasterize(text, font, self.style.size)?;
        let mut bitmap = bitmap.padded(self.label.padding as usize);
        if self.style.mirror {
            bitmap = bitmap.mirrored();
        }

        let field = GraphicsField::encode(&bitmap, &self.label);
        debug!(
            width = field.width,
            height = field.height,
            x = field.x_pos,
            y = field.y_pos,
            "graphics field ready"
        );
        Ok(field)
    }

    /// Serial label using the TTF font, or the built-in font when
    /// rasterization is not possible.
    pub fn render(&self, text: &str) -> SerialLabel {
        match self.graphics(text) {
            Ok(field) => SerialLabel {
                zpl: field.to_zpl(),
                rasterized: true,
            },
            Err(e) => {
                warn!(error = %e, "falling back to built-in font");
                SerialLabel {
                    zpl: builtin_font_label(text, &self.label),
                    rasterized: false,
                }
            }
        }
    }
}

/// Serial label in the printer's built-in font, centered with a one-line
/// field block.
pub fn builtin_font_label(text: &str, label: &LabelConfig) -> String {
    [
        START_FORMAT.to_string(),
        commands::label_home(0, 0),
        commands::field_origin(0, label.text_y),
        commands::scalable_font(label.font_height, label.font_height),
        commands::field_block(label.width_dots, 1, 0, Justify::Center, 0),
        commands::field_data(text),
        FIELD_SEPARATOR.to_string(),
        commands::print_quantity(1),
        END_FORMAT.to_string(),
    ]
    .concat()
}
