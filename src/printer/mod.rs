//! # Printer Module
//!
//! This module provides label stock configurations.
//!
//! ## Modules
//!
//! - [`config`]: Label geometry

pub mod config;

pub use config::LabelConfig;
