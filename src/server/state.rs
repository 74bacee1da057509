//! Server state and configuration.

use crate::dispatch::Dispatcher;
use crate::encoding::PayloadEncoding;
use crate::protocol::label::LabelRenderer;
use crate::template::TemplateRoot;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:5000")
    pub listen_addr: String,
}

/// Application state shared across handlers.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub renderer: LabelRenderer,
    pub templates: TemplateRoot,
    /// Encoding for `/print` requests that don't name one
    pub encoding: PayloadEncoding,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        renderer: LabelRenderer,
        templates: TemplateRoot,
        encoding: PayloadEncoding,
    ) -> Self {
        Self {
            dispatcher,
            renderer,
            templates,
            encoding,
        }
    }
}
