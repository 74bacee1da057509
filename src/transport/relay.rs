//! # Relay Transport
//!
//! Forwards jobs to a peer running `etiqueta --serve` on a host that can
//! print locally.
//!
//! ## Tiers
//!
//! | Tier | Endpoint | Body | Timeout |
//! |------|----------|------|---------|
//! | Rich | `POST /print-calibri` | `{"serial"}` | 15 s |
//! | Fallback | `POST /print` | `{"text", "printer"?, "encoding"}` | 10 s |
//!
//! The rich tier lets the peer rasterize a serial label with its own font
//! and is only tried for jobs that carry a label text. Any failure there
//! (status, connect error, timeout) moves on to the fallback tier, which
//! for serial labels sends the built-in font stream. Nothing is retried
//! beyond these two requests.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::{EtiquetaError, RelayFailure};
use crate::job::PrintJob;
use crate::printer::LabelConfig;
use crate::protocol::label::builtin_font_label;

/// Peer address used when none is configured.
pub const DEFAULT_RELAY_URL: &str = "http://10.150.20.40:9021";

/// Per-attempt budget for the rich tier.
pub const RICH_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-attempt budget for the fallback tier.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Label printed by a peer device when it does not report one.
const UNNAMED_PEER_DEVICE: &str = "remote";

#[derive(Debug, Serialize)]
struct RichRequest<'a> {
    serial: &'a str,
}

#[derive(Debug, Serialize)]
struct FallbackRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    printer: Option<&'a str>,
    encoding: &'a str,
}

/// Acknowledgment returned by both peer endpoints.
#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    printer: Option<String>,
}

/// HTTP client for a relay peer.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    client: reqwest::Client,
    label: LabelConfig,
    rich_timeout: Duration,
    fallback_timeout: Duration,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            label: LabelConfig::default(),
            rich_timeout: RICH_TIMEOUT,
            fallback_timeout: FALLBACK_TIMEOUT,
        }
    }

    /// Override the per-attempt budgets.
    pub fn with_timeouts(mut self, rich: Duration, fallback: Duration) -> Self {
        self.rich_timeout = rich;
        self.fallback_timeout = fallback;
        self
    }

    /// Label stock used for the fallback built-in font stream.
    pub fn with_label(mut self, label: LabelConfig) -> Self {
        self.label = label;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `job` to the peer and return the device it printed on.
    #[instrument(skip_all, fields(job = %job.id(), peer = %self.base_url))]
    pub async fn relay(&self, job: &PrintJob) -> Result<String, EtiquetaError> {
        let fallback_text = match job.label_text() {
            Some(serial) => {
                match self
                    .post("/print-calibri", &RichRequest { serial }, self.rich_timeout)
                    .await
                {
                    Ok(printer) => {
                        info!(printer = %printer, "printed by peer with its font");
                        return Ok(printer);
                    }
                    Err(failure) => {
                        warn!(error = %failure, "rich relay failed, sending built-in font label");
                    }
                }
                builtin_font_label(serial, &self.label)
            }
            None => job.text().to_string(),
        };

        let body = FallbackRequest {
            text: &fallback_text,
            printer: job.printer(),
            encoding: job.encoding().name(),
        };
        let printer = self
            .post("/print", &body, self.fallback_timeout)
            .await
            .map_err(EtiquetaError::RelayUnreachable)?;
        info!(printer = %printer, "printed by peer");
        Ok(printer)
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<String, RelayFailure> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayFailure::Status {
                url,
                code: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let ack: Ack = response
            .json()
            .await
            .map_err(|e| RelayFailure::InvalidResponse {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        match ack.status.as_deref() {
            None | Some("ok") => {}
            Some(other) => {
                return Err(RelayFailure::InvalidResponse {
                    url,
                    reason: format!("status '{}'", other),
                });
            }
        }

        Ok(ack.printer.unwrap_or_else(|| UNNAMED_PEER_DEVICE.to_string()))
    }
}

fn classify(url: &str, e: reqwest::Error) -> RelayFailure {
    if e.is_timeout() {
        RelayFailure::Timeout {
            url: url.to_string(),
        }
    } else {
        RelayFailure::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
