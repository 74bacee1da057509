//! Runtime configuration.
//!
//! Read from the environment (after loading a `.env` file, if any). CLI
//! flags override individual values in `main`.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ETIQUETA_TEMPLATE_ROOT` | current directory |
//! | `PRINTER_SERVER_URL` | `http://10.150.20.40:9021` |
//! | `ETIQUETA_FONT` | `C:\Windows\Fonts\calibrib.ttf` |
//! | `ETIQUETA_FONT_NAME` | `Calibri Bold` |
//! | `ETIQUETA_FONT_SIZE` | `29` |
//! | `ETIQUETA_MIRROR` | `false` |
//! | `ETIQUETA_ENCODING` | `utf-8` |
//! | `ETIQUETA_PRINT_MODE` | `auto` |
//! | `ETIQUETA_RELAY_TIMEOUT_SECS` | `15` |
//! | `ETIQUETA_RELAY_FALLBACK_TIMEOUT_SECS` | `10` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::encoding::{DEFAULT_ENCODING, PayloadEncoding};
use crate::error::EtiquetaError;
use crate::printer::LabelConfig;
use crate::protocol::label::{DEFAULT_FONT_NAME, DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE, TextStyle};
use crate::transport::relay::{DEFAULT_RELAY_URL, FALLBACK_TIMEOUT, RICH_TIMEOUT};
use crate::transport::{PrintMode, RelayClient};

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory templates must stay inside
    pub template_root: PathBuf,
    /// Base URL of the relay peer
    pub relay_url: String,
    /// TTF used for rasterized labels
    pub font_path: PathBuf,
    pub font_name: String,
    pub font_size: f32,
    /// Mirror rasterized labels
    pub mirror: bool,
    /// Encoding label for payloads that don't name one
    pub encoding: String,
    pub print_mode: PrintMode,
    pub relay_timeout: Duration,
    pub relay_fallback_timeout: Duration,
    pub label: LabelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_root: PathBuf::from("."),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            mirror: false,
            encoding: DEFAULT_ENCODING.to_string(),
            print_mode: PrintMode::Auto,
            relay_timeout: RICH_TIMEOUT,
            relay_fallback_timeout: FALLBACK_TIMEOUT,
            label: LabelConfig::default(),
        }
    }
}

impl Config {
    /// Load `.env`, then read the process environment.
    pub fn from_env() -> Result<Self, EtiquetaError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EtiquetaError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            template_root: get("ETIQUETA_TEMPLATE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_root),
            relay_url: get("PRINTER_SERVER_URL").unwrap_or(defaults.relay_url),
            font_path: get("ETIQUETA_FONT").map(PathBuf::from).unwrap_or(defaults.font_path),
            font_name: get("ETIQUETA_FONT_NAME").unwrap_or(defaults.font_name),
            font_size: parse_or("ETIQUETA_FONT_SIZE", get("ETIQUETA_FONT_SIZE"), defaults.font_size)?,
            mirror: match get("ETIQUETA_MIRROR") {
                Some(value) => parse_flag("ETIQUETA_MIRROR", &value)?,
                None => defaults.mirror,
            },
            encoding: get("ETIQUETA_ENCODING").unwrap_or(defaults.encoding),
            print_mode: parse_or("ETIQUETA_PRINT_MODE", get("ETIQUETA_PRINT_MODE"), defaults.print_mode)?,
            relay_timeout: parse_or(
                "ETIQUETA_RELAY_TIMEOUT_SECS",
                get("ETIQUETA_RELAY_TIMEOUT_SECS"),
                defaults.relay_timeout.as_secs(),
            )
            .map(Duration::from_secs)?,
            relay_fallback_timeout: parse_or(
                "ETIQUETA_RELAY_FALLBACK_TIMEOUT_SECS",
                get("ETIQUETA_RELAY_FALLBACK_TIMEOUT_SECS"),
                defaults.relay_fallback_timeout.as_secs(),
            )
            .map(Duration::from_secs)?,
            label: defaults.label,
        };

        // Fail at startup rather than on the first job
        config.payload_encoding()?;
        Ok(config)
    }

    pub fn payload_encoding(&self) -> Result<PayloadEncoding, EtiquetaError> {
        PayloadEncoding::for_label(&self.encoding)
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_name: self.font_name.clone(),
            size: self.font_size,
            mirror: self.mirror,
        }
    }

    pub fn relay_client(&self) -> RelayClient {
        RelayClient::new(&self.relay_url)
            .with_timeouts(self.relay_timeout, self.relay_fallback_timeout)
            .with_label(self.label)
    }
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, EtiquetaError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e| {
            EtiquetaError::InvalidInput(format!("{}={:?}: {}", name, raw, e))
        }),
        None => Ok(default),
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, EtiquetaError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(EtiquetaError::InvalidInput(format!(
            "{}={:?}: expected true or false",
            name, other
        ))),
    }
}
