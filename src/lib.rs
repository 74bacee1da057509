//! # Etiqueta - Zebra Label Printing Library
//!
//! Etiqueta renders serial number labels and delivers ZPL jobs to Zebra
//! label printers. It provides:
//!
//! - **Rendering**: TTF text rasterized into 1-bit bitmaps
//! - **Protocol**: ZPL builders, `^GFA` graphic fields, serial labels
//! - **Templates**: `.prn` documents with `{{1}}`-style placeholders
//! - **Dispatch**: native spooler, OS print command, or an HTTP relay peer
//! - **Server**: the HTTP endpoints relay peers talk to
//!
//! ## Quick Start
//!
//! ```no_run
//! use etiqueta::{
//!     dispatch::Dispatcher,
//!     encoding::PayloadEncoding,
//!     printer::LabelConfig,
//!     protocol::label::{LabelRenderer, TextStyle},
//!     transport::{Capability, RelayClient},
//! };
//!
//! # async fn example() -> Result<(), etiqueta::EtiquetaError> {
//! // Rasterize with Calibri Bold where it exists, built-in font elsewhere
//! let renderer = LabelRenderer::load(
//!     r"C:\Windows\Fonts\calibrib.ttf",
//!     TextStyle::default(),
//!     LabelConfig::ZEBRA_45MM,
//! );
//!
//! // Spooler on Windows, relay peer on hosts without a printer
//! let dispatcher = Dispatcher::for_capability(
//!     Capability::detect(),
//!     RelayClient::new("http://10.150.20.40:9021"),
//! )?;
//!
//! let printer = dispatcher
//!     .print_serial(&renderer, "PBS12345", None, PayloadEncoding::default())
//!     .await?;
//! println!("Printed on {}", printer);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ZPL command builders and graphic fields |
//! | [`render`] | Bitmaps and text rasterization |
//! | [`template`] | Placeholder substitution and the template root |
//! | [`job`] | Print jobs and their validation |
//! | [`encoding`] | Payload encodings |
//! | [`dispatch`] | Strategy selection and the device lock |
//! | [`transport`] | Spooler, shell print and relay backends |
//! | [`server`] | HTTP print server |
//! | [`printer`] | Label stock geometry |
//! | [`config`] | Environment configuration |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - Zebra desktop printers at 203 DPI on 45mm continuous stock
//!
//! Other ZPL II printers should work with an adjusted [`printer::LabelConfig`].

pub mod config;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod job;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use dispatch::Dispatcher;
pub use error::EtiquetaError;
pub use job::PrintJob;
pub use printer::LabelConfig;
