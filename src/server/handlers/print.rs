//! Raw and templated print jobs.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::warn;

use crate::error::EtiquetaError;
use crate::job::JobRequest;

use super::super::state::AppState;
use super::status_for;

/// Handle POST /print.
///
/// The body is parsed by hand so malformed input gets the same
/// `{"status": "error"}` shape as every other failure.
pub async fn print(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message, None),
    };

    let job = match request.prepare(&state.templates, state.encoding) {
        Ok(job) => job,
        Err(e) => return job_error(&e),
    };

    match state.dispatcher.dispatch(job).await {
        Ok(printer) => Json(json!({ "status": "ok", "printer": printer })).into_response(),
        Err(e) => {
            warn!(error = %e, "print request failed");
            job_error(&e)
        }
    }
}

fn optional_string(map: &Map<String, Value>, field: &str) -> Result<Option<String>, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("field '{}' must be a string when given", field)),
    }
}

/// Validate the JSON shape of a print request.
fn parse_request(body: &[u8]) -> Result<JobRequest, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {}", e))?;
    let Value::Object(map) = value else {
        return Err("payload must be a JSON object".into());
    };

    let variables = match map.get("variables") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(vars)) => vars
            .iter()
            .map(|(token, value)| {
                let Value::String(value) = value else {
                    return Err("values in 'variables' must be strings".to_string());
                };
                let token = token.trim();
                if token.is_empty() {
                    return Err("tokens in 'variables' cannot be empty".to_string());
                }
                Ok((token.to_string(), value.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err("field 'variables' must be an object of token: value pairs".into()),
    };

    Ok(JobRequest {
        text: optional_string(&map, "text")?,
        printer: optional_string(&map, "printer")?,
        encoding: optional_string(&map, "encoding")?,
        template: optional_string(&map, "model_prn")?.filter(|t| !t.trim().is_empty()),
        token: optional_string(&map, "token")?,
        variables,
    })
}

/// The message carries the operator hint, `details` the underlying cause.
fn job_error(err: &EtiquetaError) -> Response {
    let message = match err.hint() {
        Some(hint) => format!("{} ({})", err, hint),
        None => err.to_string(),
    };
    error_response(status_for(err), &message, err.detail().as_deref())
}

fn error_response(status: StatusCode, message: &str, details: Option<&str>) -> Response {
    let mut body = json!({ "status": "error", "message": message });
    if let Some(details) = details {
        body["details"] = Value::from(details);
    }
    (status, Json(body)).into_response()
}
