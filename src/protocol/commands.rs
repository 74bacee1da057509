//! # ZPL Commands
//!
//! Builders for the handful of ZPL II commands the label streams use.
//!
//! ## Command Structure
//!
//! Every ZPL command is a caret, a two-letter mnemonic and comma-separated
//! parameters. A label format is bracketed by `^XA` and `^XZ`; each field is
//! positioned with `^FO`, carries data (`^FD` text or `^GF` graphics) and is
//! closed by `^FS`:
//!
//! ```text
//! ^XA                      start of format
//! ^FO130,15                field origin (dots)
//! ^GFA,40,40,2,FF80...     graphic field, ASCII hex
//! ^FS                      field separator
//! ^XZ                      end of format
//! ```
//!
//! ## Reference
//!
//! Based on the "ZPL II Programming Guide" by Zebra Technologies.

/// `^XA` - Start of label format
pub const START_FORMAT: &str = "^XA";

/// `^XZ` - End of label format
pub const END_FORMAT: &str = "^XZ";

/// `^FS` - Field separator, closes the current field
pub const FIELD_SEPARATOR: &str = "^FS";

/// Text justification inside a field block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Center,
    Right,
    Justified,
}

impl Justify {
    fn code(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Center => 'C',
            Self::Right => 'R',
            Self::Justified => 'J',
        }
    }
}

/// # Field Origin (^FOx,y)
///
/// Sets the upper-left corner of the next field, in dots relative to the
/// label home.
///
/// ```
/// use etiqueta::protocol::commands;
///
/// assert_eq!(commands::field_origin(130, 15), "^FO130,15");
/// ```
#[inline]
pub fn field_origin(x: u32, y: u32) -> String {
    format!("^FO{},{}", x, y)
}

/// # Label Home (^LHx,y)
///
/// Moves the origin all field positions are relative to.
#[inline]
pub fn label_home(x: u32, y: u32) -> String {
    format!("^LH{},{}", x, y)
}

/// # Scalable Font (^A0N,h,w)
///
/// Selects the printer's built-in scalable font 0, normal orientation.
#[inline]
pub fn scalable_font(height: u32, width: u32) -> String {
    format!("^A0N,{},{}", height, width)
}

/// # Field Block (^FBw,l,s,j,h)
///
/// Wraps field data in a block `width` dots wide with at most `lines` lines.
/// A one-line centered block is how text is centered on a label without
/// knowing its rendered width.
#[inline]
pub fn field_block(width: u32, lines: u32, line_spacing: i32, justify: Justify, hanging: u32) -> String {
    format!(
        "^FB{},{},{},{},{}",
        width,
        lines,
        line_spacing,
        justify.code(),
        hanging
    )
}

/// # Field Data (^FD)
///
/// Text for the current field. The caller closes the field with `^FS`.
#[inline]
pub fn field_data(text: &str) -> String {
    format!("^FD{}", text)
}

/// # Print Quantity (^PQ)
#[inline]
pub fn print_quantity(count: u32) -> String {
    format!("^PQ{}", count)
}

/// # Graphic Field (^GFA,b,c,d,data)
///
/// ASCII-hex graphic field. `b` (binary byte count) and `c` (graphic field
/// count) are both the total byte count for uncompressed data; `d` is bytes
/// per row.
///
/// ```
/// use etiqueta::protocol::commands;
///
/// assert_eq!(commands::graphic_field(2, 2, "FF80"), "^GFA,2,2,2,FF80");
/// ```
#[inline]
pub fn graphic_field(total_bytes: usize, bytes_per_row: usize, hex: &str) -> String {
    format!("^GFA,{},{},{},{}", total_bytes, total_bytes, bytes_per_row, hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_block_centered() {
        assert_eq!(field_block(360, 1, 0, Justify::Center, 0), "^FB360,1,0,C,0");
    }

    #[test]
    fn test_font_and_home() {
        assert_eq!(scalable_font(29, 29), "^A0N,29,29");
        assert_eq!(label_home(0, 0), "^LH0,0");
    }

    #[test]
    fn test_field_data_and_quantity() {
        assert_eq!(field_data("PBS12345"), "^FDPBS12345");
        assert_eq!(print_quantity(1), "^PQ1");
    }

    #[test]
    fn test_graphic_field_duplicates_total() {
        assert_eq!(graphic_field(40, 2, "00"), "^GFA,40,40,2,00");
    }
}
