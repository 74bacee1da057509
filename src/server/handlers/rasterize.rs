//! Serial labels rasterized on this host.
//!
//! Peers without the label font send just the serial here. A 500 tells
//! them to fall back to a built-in font label on `/print`.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::encoding::PayloadEncoding;
use crate::job::PrintJob;

use super::super::state::AppState;
use super::status_for;

#[derive(Debug, Deserialize)]
struct SerialRequest {
    #[serde(default)]
    serial: Option<String>,
}

/// Handle POST /print-calibri.
pub async fn print_calibri(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let serial = serde_json::from_slice::<SerialRequest>(&body)
        .ok()
        .and_then(|r| r.serial)
        .filter(|s| !s.trim().is_empty());
    let Some(serial) = serial else {
        return error_response(StatusCode::BAD_REQUEST, "serial is required".into());
    };

    let render_state = Arc::clone(&state);
    let render_serial = serial.clone();
    let rendered =
        tokio::task::spawn_blocking(move || render_state.renderer.graphics(&render_serial)).await;

    let field = match rendered {
        Ok(Ok(field)) => field,
        Ok(Err(e)) => {
            warn!(error = %e, "cannot rasterize serial");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
        Err(e) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("task error: {}", e));
        }
    };

    let zpl = field.to_zpl();
    let size = zpl.len();
    // Sent as a plain stream so a relaying dispatcher never bounces it back
    // to a rich endpoint
    let job = match PrintJob::new(zpl, None, PayloadEncoding::default()) {
        Ok(job) => job,
        Err(e) => return error_response(status_for(&e), e.to_string()),
    };

    match state.dispatcher.dispatch(job).await {
        Ok(printer) => {
            info!(serial = %serial, printer = %printer, bytes = size, "serial label printed");
            Json(json!({
                "status": "ok",
                "printer": printer,
                "font": state.renderer.style().font_name,
                "size": size,
            }))
            .into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
