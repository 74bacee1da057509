//! # Label Stock Configuration
//!
//! This module defines the geometry of the label stock the control streams
//! are laid out for.
//!
//! ## Supported Stock
//!
//! | Stock | Width (dots) | Resolution | Graphics origin Y | Padding |
//! |-------|--------------|------------|-------------------|---------|
//! | Zebra 45mm continuous | 360 | 203 DPI | 15 | 10 |
//!
//! ## Usage
//!
//! ```
//! use etiqueta::printer::LabelConfig;
//!
//! let config = LabelConfig::ZEBRA_45MM;
//! println!("Label width: {} dots ({:.1} mm)",
//!          config.width_dots,
//!          config.width_mm());
//! ```

/// # Label Configuration
///
/// Describes where fields land on a label.
///
/// ## Physical Properties
///
/// - **width_dots**: Printable label width, used to center graphics fields
/// - **dpi**: Resolution in dots per inch
///
/// ## Layout
///
/// - **graphics_y**: Y origin of a rasterized text field (`^FO x,15`)
/// - **padding**: Blank margin added around rasterized text on all sides
/// - **text_y**: Y origin of the built-in font fallback field (`^FO0,20`)
/// - **font_height**: Built-in font height/width for the fallback (`^A0N,29,29`)
///
/// ```text
/// ├──────────────── 360 dots ────────────────┤
/// │        ┌──────────────────────┐          │  ← graphics_y
/// │ x_pos  │ padding  TEXT padding│          │
/// │        └──────────────────────┘          │
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LabelConfig {
    /// Label stock name
    pub name: &'static str,

    /// Printable width in dots
    pub width_dots: u32,

    /// Resolution in dots per inch
    pub dpi: u32,

    /// Y origin for graphics fields
    pub graphics_y: u32,

    /// Margin around rasterized text, in dots
    pub padding: u32,

    /// Y origin for the built-in font fallback
    pub text_y: u32,

    /// Built-in font height and width for the fallback
    pub font_height: u32,
}

impl LabelConfig {
    /// # Zebra 45mm Continuous Stock
    ///
    /// Serial number labels on 203 DPI Zebra printers.
    ///
    /// ## Print Area
    ///
    /// ```text
    /// ├────────── 45mm (360 dots) ──────────┤
    /// ```
    pub const ZEBRA_45MM: Self = Self {
        name: "Zebra 45mm continuous",
        width_dots: 360,
        dpi: 203,
        graphics_y: 15,
        padding: 10,
        text_y: 20,
        font_height: 29,
    };

    /// Calculate dots per millimeter
    ///
    /// ## Example
    ///
    /// ```
    /// use etiqueta::printer::LabelConfig;
    ///
    /// let config = LabelConfig::ZEBRA_45MM;
    /// assert!((config.dots_per_mm() - 8.0).abs() < 0.1);
    /// ```
    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Calculate label width in millimeters
    #[inline]
    pub fn width_mm(&self) -> f32 {
        self.width_dots as f32 / self.dots_per_mm()
    }

    /// X origin that centers a field of `width` dots on the label.
    ///
    /// Fields wider than the label are pinned to 0 and overflow to the right.
    #[inline]
    pub fn centered_x(&self, width: usize) -> u32 {
        (self.width_dots as usize).saturating_sub(width) as u32 / 2
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self::ZEBRA_45MM
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zebra_45mm_dimensions() {
        let config = LabelConfig::ZEBRA_45MM;
        assert_eq!(config.width_dots, 360);
        assert_eq!(config.graphics_y, 15);
        assert_eq!(config.padding, 10);
    }

    #[test]
    fn test_width_mm() {
        let width = LabelConfig::ZEBRA_45MM.width_mm();
        // 360 dots / 8 dpmm = 45mm
        assert!((width - 45.0).abs() < 1.0);
    }

    #[test]
    fn test_centered_x() {
        let config = LabelConfig::ZEBRA_45MM;
        assert_eq!(config.centered_x(100), 130);
        assert_eq!(config.centered_x(101), 129);
        assert_eq!(config.centered_x(360), 0);
    }

    #[test]
    fn test_centered_x_clamps_wide_fields() {
        assert_eq!(LabelConfig::ZEBRA_45MM.centered_x(500), 0);
    }

    #[test]
    fn test_default_is_zebra_45mm() {
        assert_eq!(LabelConfig::default().name, LabelConfig::ZEBRA_45MM.name);
    }
}
