//! # Error Types
//!
//! This module defines error types used throughout the etiqueta library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// The glyph source could not be loaded (missing file, unsupported font)
    #[error("Font unavailable: {font}: {reason}")]
    FontUnavailable { font: String, reason: String },

    /// Template substitution left supplied tokens unmatched
    #[error("Token(s) {} not found in template", format_tokens(.0))]
    MissingToken(Vec<String>),

    /// Template path resolves outside the trusted root
    #[error("Template {} is outside the template root {}", .path.display(), .root.display())]
    TemplateOutOfBounds { path: PathBuf, root: PathBuf },

    /// Template missing or not a regular file
    #[error("Template error: {0}")]
    Template(String),

    /// The spooler accepted fewer bytes than were submitted
    #[error("Only {written} of {expected} bytes were sent to the spooler")]
    ShortWrite { written: usize, expected: usize },

    /// No named or default device could be resolved
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Both relay tiers failed
    #[error("Relay unreachable: {0}")]
    RelayUnreachable(#[source] RelayFailure),

    /// Payload cannot be represented in the requested encoding
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Nothing to print, or malformed job input
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Invalid bitmap geometry or graphics data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Native spooler call failed
    #[error("Spooler error: {0}")]
    Spooler(String),

    /// External print process failed
    #[error("Shell print failed: {0}")]
    ShellPrint(String),

    /// Preview image could not be written
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a relay attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayFailure {
    #[error("timed out connecting to {url}")]
    Timeout { url: String },

    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("{url} answered HTTP {code}: {body}")]
    Status { url: String, code: u16, body: String },

    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

impl RelayFailure {
    /// True when the peer never answered (down, wrong address, timed out).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connect { .. })
    }
}

impl EtiquetaError {
    /// Errors caused by the request itself rather than by the print path.
    ///
    /// The HTTP layer maps these to 400, everything else to 500.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MissingToken(_)
                | Self::TemplateOutOfBounds { .. }
                | Self::Template(_)
                | Self::EncodingError(_)
                | Self::InvalidJob(_)
                | Self::InvalidInput(_)
        )
    }

    /// The low-level failure behind this error, when there is one.
    pub fn detail(&self) -> Option<String> {
        std::error::Error::source(self).map(ToString::to_string)
    }

    /// Actionable guidance for the operator, when there is one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RelayUnreachable(failure) if failure.is_unreachable() => {
                Some("check that the remote print service is running")
            }
            Self::EncodingError(_) => Some("choose a different encoding (--encoding or \"encoding\")"),
            Self::DeviceUnavailable(_) => Some("pass a printer name or configure a default printer"),
            _ => None,
        }
    }
}

fn format_tokens(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_lists_every_token() {
        let err = EtiquetaError::MissingToken(vec!["{{2}}".into(), "3".into()]);
        assert_eq!(err.to_string(), "Token(s) '{{2}}', '3' not found in template");
    }

    #[test]
    fn test_relay_hint_only_when_unreachable() {
        let down = EtiquetaError::RelayUnreachable(RelayFailure::Connect {
            url: "http://peer/print".into(),
            reason: "refused".into(),
        });
        assert!(down.hint().is_some());

        let rejected = EtiquetaError::RelayUnreachable(RelayFailure::Status {
            url: "http://peer/print".into(),
            code: 500,
            body: "boom".into(),
        });
        assert!(rejected.hint().is_none());
        assert_eq!(rejected.detail().as_deref(), Some("http://peer/print answered HTTP 500: boom"));
    }

    #[test]
    fn test_detail_only_for_wrapped_failures() {
        let io = EtiquetaError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.detail().as_deref(), Some("gone"));
        assert!(EtiquetaError::InvalidJob("empty".into()).detail().is_none());
    }

    #[test]
    fn test_caller_errors() {
        assert!(EtiquetaError::InvalidJob("empty".into()).is_caller_error());
        assert!(!EtiquetaError::ShortWrite { written: 1, expected: 2 }.is_caller_error());
    }
}
