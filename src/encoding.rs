//! Payload encodings.
//!
//! Labels are resolved with `encoding_rs`, which follows the WHATWG label
//! table: `utf-8`, `windows-1252`, `cp1252`, `latin1`, `utf-16le`, `gbk`
//! and so on. Note that WHATWG maps `iso-8859-1` and `ascii` to
//! windows-1252. Labels WHATWG sends to its replacement encoding
//! (`iso-2022-kr`, `hz-gb-2312`, ...) are rejected.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use tracing::instrument;

use crate::error::EtiquetaError;

/// Encoding used when the caller does not name one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// A resolved payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadEncoding {
    encoding: &'static Encoding,
}

impl PayloadEncoding {
    /// Resolve a label such as `"utf-8"` or `"cp1252"`.
    pub fn for_label(label: &str) -> Result<Self, EtiquetaError> {
        Encoding::for_label_no_replacement(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| {
                EtiquetaError::EncodingError(format!("unknown encoding '{}'", label))
            })
    }

    /// Canonical name, e.g. `windows-1252`.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encode `text`, failing on characters the encoding cannot represent.
    #[instrument(skip(self, text), fields(encoding = self.name(), chars = text.len()))]
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EtiquetaError> {
        // encode() writes UTF-8 for the UTF-16 family
        if self.encoding == UTF_16LE {
            return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.encoding == UTF_16BE {
            return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }

        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            let bad: String = text
                .chars()
                .filter(|c| {
                    let mut buf = [0u8; 4];
                    self.encoding.encode(c.encode_utf8(&mut buf)).2
                })
                .take(5)
                .collect();
            return Err(EtiquetaError::EncodingError(format!(
                "characters {:?} cannot be represented in {}",
                bad,
                self.name()
            )));
        }
        Ok(bytes.into_owned())
    }
}

impl Default for PayloadEncoding {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let enc = PayloadEncoding::for_label("UTF-8").unwrap();
        assert_eq!(enc.encode("Peça").unwrap(), "Peça".as_bytes());
    }

    #[test]
    fn test_cp1252_single_byte() {
        let enc = PayloadEncoding::for_label("cp1252").unwrap();
        assert_eq!(enc.name(), "windows-1252");
        assert_eq!(enc.encode("ç").unwrap(), vec![0xE7u8]);
    }

    #[test]
    fn test_unmappable_character_is_encoding_error() {
        let enc = PayloadEncoding::for_label("windows-1252").unwrap();
        let err = enc.encode("^FD漢字^FS").unwrap_err();
        assert!(matches!(err, EtiquetaError::EncodingError(_)));
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_unknown_label() {
        assert!(matches!(
            PayloadEncoding::for_label("klingon"),
            Err(EtiquetaError::EncodingError(_))
        ));
    }

    #[test]
    fn test_replacement_labels_rejected() {
        for label in ["iso-2022-kr", "hz-gb-2312", "csiso2022kr"] {
            assert!(
                matches!(PayloadEncoding::for_label(label), Err(EtiquetaError::EncodingError(_))),
                "{} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_utf16le_is_really_utf16() {
        let enc = PayloadEncoding::for_label("utf-16le").unwrap();
        assert_eq!(enc.encode("^X").unwrap(), vec![b'^', 0, b'X', 0]);
    }
}
