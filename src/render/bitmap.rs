//! Monochrome bitmaps.
//!
//! A [`Bitmap`] holds one flag per pixel, row-major from the top-left
//! corner. `true` is ink (printed dot), `false` is background.

use crate::error::EtiquetaError;

/// A 1-bit image with non-zero dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Create a blank (all background) bitmap.
    pub fn new(width: usize, height: usize) -> Result<Self, EtiquetaError> {
        if width == 0 || height == 0 {
            return Err(EtiquetaError::InvalidInput(format!(
                "bitmap dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![false; width * height],
        })
    }

    /// Build a bitmap from row-major pixel flags.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<bool>) -> Result<Self, EtiquetaError> {
        let bitmap = Self::new(width, height)?;
        if pixels.len() != width * height {
            return Err(EtiquetaError::InvalidInput(format!(
                "expected {} pixels for {}x{}, got {}",
                width * height,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self { pixels, ..bitmap })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at `(x, y)` is ink. Out-of-range reads are background.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    /// Set the pixel at `(x, y)`. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, ink: bool) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = ink;
        }
    }

    /// One row of pixels.
    pub fn row(&self, y: usize) -> &[bool] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Number of ink pixels.
    pub fn ink_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    /// Copy into a larger blank bitmap with `margin` background pixels on
    /// every side.
    pub fn padded(&self, margin: usize) -> Self {
        let width = self.width + 2 * margin;
        let height = self.height + 2 * margin;
        let mut pixels = vec![false; width * height];
        for y in 0..self.height {
            let start = (y + margin) * width + margin;
            pixels[start..start + self.width].copy_from_slice(self.row(y));
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Flip left-to-right: pixel order within each row is reversed, row
    /// order is kept.
    pub fn mirrored(&self) -> Self {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for y in 0..self.height {
            pixels.extend(self.row(y).iter().rev());
        }
        Self {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}
