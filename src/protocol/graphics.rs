//! # ZPL Graphic Fields
//!
//! Packs a [`Bitmap`] into a `^GFA` graphic field and back.
//!
//! ## Bit Packing
//!
//! Each row is split into 8-pixel chunks, the last one zero-padded:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! Every byte is written as two uppercase hex digits and rows are
//! concatenated top to bottom:
//!
//! ```text
//! 9 dots wide, all black:  █████████
//! bytes:                   11111111 1·······
//! hex:                     FF       80
//! ```
//!
//! ## Placement
//!
//! The field is centered on the label: `x = (label_width - width) / 2`,
//! pinned to 0 when the bitmap is wider than the label.

use crate::error::EtiquetaError;
use crate::printer::LabelConfig;
use crate::render::Bitmap;

use super::commands::{self, END_FORMAT, FIELD_SEPARATOR, START_FORMAT};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes needed to hold one row of `width` pixels.
#[inline]
pub fn bytes_per_row(width: usize) -> usize {
    width.div_ceil(8)
}

/// Pack one row of pixels, MSB first.
pub fn pack_row(row: &[bool]) -> Vec<u8> {
    row.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|(_, ink)| **ink)
                .fold(0u8, |byte, (i, _)| byte | (0x80 >> i))
        })
        .collect()
}

/// A bitmap packed for a `^GFA` command, with its position on the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicsField {
    pub width: usize,
    pub height: usize,
    pub bytes_per_row: usize,
    pub total_bytes: usize,
    /// Uppercase hex, `2 * total_bytes` characters
    pub hex: String,
    pub x_pos: u32,
    pub y_pos: u32,
}

impl GraphicsField {
    /// Pack `bitmap` and center it on `label`.
    pub fn encode(bitmap: &Bitmap, label: &LabelConfig) -> Self {
        let bytes_per_row = bytes_per_row(bitmap.width());
        let total_bytes = bytes_per_row * bitmap.height();

        let mut hex = String::with_capacity(total_bytes * 2);
        for y in 0..bitmap.height() {
            for byte in pack_row(bitmap.row(y)) {
                hex.push(HEX_DIGITS[(byte >> 4) as usize] as char);
                hex.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
            }
        }

        debug_assert_eq!(hex.len(), total_bytes * 2);

        Self {
            width: bitmap.width(),
            height: bitmap.height(),
            bytes_per_row,
            total_bytes,
            hex,
            x_pos: label.centered_x(bitmap.width()),
            y_pos: label.graphics_y,
        }
    }

    /// Unpack the hex payload back into a bitmap.
    pub fn decode(&self) -> Result<Bitmap, EtiquetaError> {
        decode_hex(&self.hex, self.width, self.height)
    }

    /// The hex payload split per row, `2 * bytes_per_row` characters each.
    pub fn hex_rows(&self) -> impl Iterator<Item = &str> {
        let row_len = self.bytes_per_row * 2;
        (0..self.height).map(move |y| &self.hex[y * row_len..(y + 1) * row_len])
    }

    /// `^FO` + `^GFA` + `^FS` for embedding in a larger format.
    pub fn field(&self) -> String {
        let mut out = commands::field_origin(self.x_pos, self.y_pos);
        out.push_str(&commands::graphic_field(
            self.total_bytes,
            self.bytes_per_row,
            &self.hex,
        ));
        out.push_str(FIELD_SEPARATOR);
        out
    }

    /// A complete one-field label format.
    pub fn to_zpl(&self) -> String {
        format!("{}{}{}", START_FORMAT, self.field(), END_FORMAT)
    }
}

/// Decode an ASCII-hex graphic field of known dimensions.
pub fn decode_hex(hex: &str, width: usize, height: usize) -> Result<Bitmap, EtiquetaError> {
    let bytes_per_row = bytes_per_row(width);
    let expected = bytes_per_row * height * 2;
    if hex.len() != expected {
        return Err(EtiquetaError::InvalidInput(format!(
            "graphic field for {}x{} needs {} hex digits, got {}",
            width,
            height,
            expected,
            hex.len()
        )));
    }

    let bytes = hex
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| {
                    EtiquetaError::InvalidInput(format!(
                        "invalid hex byte {:?}",
                        String::from_utf8_lossy(pair)
                    ))
                })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let mut bitmap = Bitmap::new(width, height)?;
    for (y, row) in bytes.chunks(bytes_per_row).enumerate() {
        for x in 0..width {
            let ink = (row[x / 8] >> (7 - (x % 8))) & 1 == 1;
            bitmap.set(x, y, ink);
        }
    }
    Ok(bitmap)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Deterministic pseudo-random bitmap.
    fn noise(width: usize, height: usize, seed: u32) -> Bitmap {
        let mut state = seed;
        let pixels = (0..width * height)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) & 1 == 1
            })
            .collect();
        Bitmap::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_nine_dots_all_black() {
        let bitmap = Bitmap::from_pixels(9, 1, vec![true; 9]).unwrap();
        let field = GraphicsField::encode(&bitmap, &LabelConfig::ZEBRA_45MM);

        assert_eq!(field.bytes_per_row, 2);
        assert_eq!(field.total_bytes, 2);
        assert_eq!(field.hex, "FF80");
    }

    #[test]
    fn test_bit_order_msb_is_leftmost() {
        let mut bitmap = Bitmap::new(8, 1).unwrap();
        bitmap.set(0, 0, true);
        bitmap.set(7, 0, true);
        let field = GraphicsField::encode(&bitmap, &LabelConfig::ZEBRA_45MM);
        assert_eq!(field.hex, "81");
    }

    #[test]
    fn test_bytes_per_row_is_ceil_width_over_8() {
        for width in 1..=64 {
            assert_eq!(bytes_per_row(width), (width + 7) / 8, "width {}", width);
        }
    }

    #[test]
    fn test_row_length_is_twice_bytes_per_row() {
        for width in [1, 7, 8, 9, 15, 16, 17, 100] {
            let field = GraphicsField::encode(&noise(width, 5, width as u32), &LabelConfig::ZEBRA_45MM);
            assert_eq!(field.hex.len(), 2 * field.total_bytes);
            for row in field.hex_rows() {
                assert_eq!(row.len(), 2 * bytes_per_row(width));
            }
        }
    }

    #[test]
    fn test_decode_restores_bitmap() {
        for (width, height) in [(1, 1), (9, 3), (16, 2), (33, 7), (120, 40)] {
            let bitmap = noise(width, height, (width * height) as u32);
            let field = GraphicsField::encode(&bitmap, &LabelConfig::ZEBRA_45MM);
            assert_eq!(field.decode().unwrap(), bitmap);
        }
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        assert!(decode_hex("FF8", 9, 1).is_err());
        assert!(decode_hex("FF80FF", 9, 1).is_err());
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(decode_hex("ZZ", 8, 1).is_err());
    }

    #[test]
    fn test_mirror_before_encoding() {
        let mut bitmap = Bitmap::new(9, 1).unwrap();
        bitmap.set(0, 0, true);
        let field = GraphicsField::encode(&bitmap.mirrored(), &LabelConfig::ZEBRA_45MM);
        // Pixel 8 is bit 7 of the second byte
        assert_eq!(field.hex, "0080");
    }

    #[test]
    fn test_centered_placement() {
        let field = GraphicsField::encode(&noise(100, 2, 1), &LabelConfig::ZEBRA_45MM);
        assert_eq!(field.x_pos, 130);
        assert_eq!(field.y_pos, 15);
    }

    #[test]
    fn test_wide_bitmap_pinned_to_left_edge() {
        let field = GraphicsField::encode(&noise(400, 1, 2), &LabelConfig::ZEBRA_45MM);
        assert_eq!(field.x_pos, 0);
    }

    #[test]
    fn test_control_stream_layout() {
        let bitmap = Bitmap::from_pixels(9, 1, vec![true; 9]).unwrap();
        let field = GraphicsField::encode(&bitmap, &LabelConfig::ZEBRA_45MM);
        assert_eq!(field.to_zpl(), "^XA^FO175,15^GFA,2,2,2,FF80^FS^XZ");
    }
}
