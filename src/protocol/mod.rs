//! # ZPL Protocol Implementation
//!
//! This module provides builders for the ZPL II label language used by
//! Zebra label printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Format brackets, field positioning, fonts and field data
//! - [`graphics`]: `^GFA` graphic fields from 1-bit bitmaps
//! - [`label`]: Complete serial number labels
//!
//! ## Usage Example
//!
//! ```
//! use etiqueta::printer::LabelConfig;
//! use etiqueta::protocol::graphics::GraphicsField;
//! use etiqueta::render::Bitmap;
//!
//! let bitmap = Bitmap::from_pixels(9, 1, vec![true; 9])?;
//! let field = GraphicsField::encode(&bitmap, &LabelConfig::ZEBRA_45MM);
//!
//! assert_eq!(field.to_zpl(), "^XA^FO175,15^GFA,2,2,2,FF80^FS^XZ");
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```

pub mod commands;
pub mod graphics;
pub mod label;
