//! HTTP handlers for the server.

pub mod health;
pub mod print;
pub mod rasterize;

use axum::http::StatusCode;

use crate::error::EtiquetaError;

/// Status code for a failed job: caller mistakes are 400, the rest 500.
fn status_for(err: &EtiquetaError) -> StatusCode {
    if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
