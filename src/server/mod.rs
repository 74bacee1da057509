//! # HTTP Print Server
//!
//! Accepts print jobs from other hosts, typically peers that have no local
//! printer and relay to this one.
//!
//! ## Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET | `/health` | |
//! | POST | `/print` | `{"text", "printer"?, "model_prn"?, "token"?, "variables"?, "encoding"?}` |
//! | POST | `/print-calibri` | `{"serial"}` |
//!
//! ## Usage
//!
//! ```bash
//! etiqueta --serve --host 0.0.0.0 --port 5000
//! ```

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::EtiquetaError;

/// Routes with `state` attached.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/print", post(handlers::print::print))
        .route("/print-calibri", post(handlers::rasterize::print_calibri))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use etiqueta::dispatch::Dispatcher;
/// use etiqueta::encoding::PayloadEncoding;
/// use etiqueta::printer::LabelConfig;
/// use etiqueta::protocol::label::{LabelRenderer, TextStyle};
/// use etiqueta::server::{AppState, ServerConfig, serve};
/// use etiqueta::template::TemplateRoot;
/// use etiqueta::transport::RelayClient;
///
/// # async fn example() -> Result<(), etiqueta::EtiquetaError> {
/// let state = AppState::new(
///     Dispatcher::relay(RelayClient::new("http://10.150.20.40:9021")),
///     LabelRenderer::new(None, TextStyle::default(), LabelConfig::ZEBRA_45MM),
///     TemplateRoot::new(".")?,
///     PayloadEncoding::default(),
/// );
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:5000".to_string(),
/// };
///
/// serve(config, state).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), EtiquetaError> {
    info!(
        listen = %config.listen_addr,
        via = %state.dispatcher.capability(),
        rasterize = state.renderer.can_rasterize(),
        templates = %state.templates.path().display(),
        "starting print server"
    );

    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            EtiquetaError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to bind to {}: {}", config.listen_addr, e),
            ))
        })?;

    println!("Etiqueta print server listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
