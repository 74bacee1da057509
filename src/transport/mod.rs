//! # Print Transports
//!
//! Ways a job can reach a label printer.
//!
//! ## Available Transports
//!
//! - [`spooler`]: Raw documents through the Windows print spooler
//! - [`shell`]: The OS print command on a temporary file
//! - [`relay`]: HTTP forwarding to a peer `etiqueta --serve`
//!
//! Which of them a process can use is decided once at startup by
//! [`Capability::detect`] (or forced with a [`PrintMode`]).

pub mod relay;
pub mod shell;
pub mod spooler;

pub use relay::RelayClient;
pub use shell::ShellPrint;
pub use spooler::Spooler;

use std::fmt;
use std::str::FromStr;

use crate::error::EtiquetaError;

/// Local printing capability of this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// A native spooler binding is compiled in
    Native,
    /// Only the OS print command is available
    ShellOnly,
    /// No local printing; jobs go to the relay peer
    None,
}

impl Capability {
    /// What this build can do on this platform.
    pub fn detect() -> Self {
        if cfg!(all(windows, feature = "spooler")) {
            Capability::Native
        } else if cfg!(windows) {
            Capability::ShellOnly
        } else {
            Capability::None
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Native => "native spooler",
            Capability::ShellOnly => "shell print",
            Capability::None => "relay",
        })
    }
}

/// Operator override for the capability detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PrintMode {
    #[default]
    Auto,
    Native,
    Shell,
    Relay,
}

impl PrintMode {
    pub fn capability(self) -> Capability {
        match self {
            PrintMode::Auto => Capability::detect(),
            PrintMode::Native => Capability::Native,
            PrintMode::Shell => Capability::ShellOnly,
            PrintMode::Relay => Capability::None,
        }
    }
}

impl FromStr for PrintMode {
    type Err = EtiquetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(PrintMode::Auto),
            "native" => Ok(PrintMode::Native),
            "shell" => Ok(PrintMode::Shell),
            "relay" => Ok(PrintMode::Relay),
            other => Err(EtiquetaError::InvalidInput(format!(
                "unknown print mode '{}' (auto, native, shell, relay)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_matches_platform() {
        let cap = Capability::detect();
        if cfg!(windows) {
            assert_ne!(cap, Capability::None);
        } else {
            assert_eq!(cap, Capability::None);
        }
    }

    #[test]
    fn test_mode_overrides_detection() {
        assert_eq!(PrintMode::Relay.capability(), Capability::None);
        assert_eq!(PrintMode::Shell.capability(), Capability::ShellOnly);
        assert_eq!(PrintMode::Auto.capability(), Capability::detect());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Relay".parse::<PrintMode>().unwrap(), PrintMode::Relay);
        assert_eq!("".parse::<PrintMode>().unwrap(), PrintMode::Auto);
        assert!("bluetooth".parse::<PrintMode>().is_err());
    }
}
