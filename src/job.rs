//! # Print Jobs
//!
//! A [`PrintJob`] is the unit the dispatcher consumes: the final control
//! stream, already encoded to bytes, plus the device it is meant for.
//! Jobs are validated when they are built and never touch the OS or the
//! network while doing so.
//!
//! Requests arriving from the CLI or HTTP are first collected in a
//! [`JobRequest`], which knows how to pull in a template and substitute
//! its tokens before producing the job.

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::encoding::PayloadEncoding;
use crate::error::EtiquetaError;
use crate::protocol::label::SerialLabel;
use crate::template::{DEFAULT_PRIMARY_TOKEN, TemplateRoot, variables_cover_token};

/// One print request, ready for dispatch.
#[derive(Debug)]
pub struct PrintJob {
    id: Uuid,
    text: String,
    payload: Vec<u8>,
    printer: Option<String>,
    encoding: PayloadEncoding,
    template: Option<PathBuf>,
    label_text: Option<String>,
}

impl PrintJob {
    /// Job for a literal control stream.
    pub fn new(
        text: impl Into<String>,
        printer: Option<String>,
        encoding: PayloadEncoding,
    ) -> Result<Self, EtiquetaError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EtiquetaError::InvalidJob("nothing to print".into()));
        }
        let payload = encoding.encode(&text)?;

        Ok(Self {
            id: Uuid::new_v4(),
            text,
            payload,
            printer: printer.filter(|p| !p.trim().is_empty()),
            encoding,
            template: None,
            label_text: None,
        })
    }

    /// Job for a rendered serial label.
    ///
    /// The serial is kept so a relay peer can rasterize it with its own font.
    pub fn serial(
        serial: impl Into<String>,
        label: SerialLabel,
        printer: Option<String>,
        encoding: PayloadEncoding,
    ) -> Result<Self, EtiquetaError> {
        let serial = serial.into();
        if serial.trim().is_empty() {
            return Err(EtiquetaError::InvalidJob("serial number is empty".into()));
        }
        let mut job = Self::new(label.zpl, printer, encoding)?;
        job.label_text = Some(serial);
        Ok(job)
    }

    fn with_template(mut self, path: PathBuf) -> Self {
        self.template = Some(path);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Control stream as text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Control stream in the job's encoding.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Requested device, `None` for the system default.
    pub fn printer(&self) -> Option<&str> {
        self.printer.as_deref()
    }

    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    /// Template the stream was produced from.
    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    /// Plain label text for serial label jobs.
    pub fn label_text(&self) -> Option<&str> {
        self.label_text.as_deref()
    }

    /// Spooler document name.
    pub fn document_name(&self) -> String {
        format!("etiqueta {}", self.id)
    }
}

/// Unvalidated job input as it arrives from the CLI or HTTP.
#[derive(Debug, Clone, Default)]
pub struct JobRequest {
    pub text: Option<String>,
    pub printer: Option<String>,
    pub encoding: Option<String>,
    /// Template path, relative to the template root
    pub template: Option<String>,
    /// Token receiving `text`, `{{1}}` when unset
    pub token: Option<String>,
    /// Named tokens in the order they were supplied
    pub variables: Vec<(String, String)>,
}

impl JobRequest {
    pub fn primary_token(&self) -> &str {
        self.token.as_deref().unwrap_or(DEFAULT_PRIMARY_TOKEN)
    }

    fn primary_value(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether the primary token is supplied through `variables`.
    pub fn primary_covered(&self) -> bool {
        variables_cover_token(self.primary_token(), &self.variables)
    }

    /// Check that there is something to print.
    pub fn validate(&self) -> Result<(), EtiquetaError> {
        if let Some((name, _)) = self.variables.iter().find(|(name, _)| name.trim().is_empty()) {
            return Err(EtiquetaError::InvalidJob(format!(
                "variable names cannot be empty (got {:?})",
                name
            )));
        }

        if self.primary_token().trim().is_empty() {
            return Err(EtiquetaError::InvalidJob(
                "the primary token cannot be empty".into(),
            ));
        }

        match (&self.template, self.primary_value()) {
            (None, None) => Err(EtiquetaError::InvalidJob(
                "'text' is required when no template is given".into(),
            )),
            (Some(_), None) if !self.primary_covered() => Err(EtiquetaError::InvalidJob(format!(
                "provide a value for the primary token {} (text or variables)",
                self.primary_token()
            ))),
            _ => Ok(()),
        }
    }

    /// Resolve the template, substitute tokens and build the job.
    pub fn prepare(
        self,
        root: &TemplateRoot,
        default_encoding: PayloadEncoding,
    ) -> Result<PrintJob, EtiquetaError> {
        self.validate()?;

        let encoding = match self.encoding.as_deref() {
            Some(label) => PayloadEncoding::for_label(label)?,
            None => default_encoding,
        };

        let Some(template_path) = self.template.as_deref() else {
            return PrintJob::new(self.text.unwrap_or_default(), self.printer, encoding);
        };

        let template = root
            .load(template_path)?
            .with_primary_token(self.primary_token());
        let text = template.apply(self.primary_value(), &self.variables)?;
        debug!(
            template = %template_path,
            variables = self.variables.len(),
            "template applied"
        );

        let path = template.path().map(Path::to_path_buf).unwrap_or_default();
        Ok(PrintJob::new(text, self.printer, encoding)?.with_template(path))
    }
}

/// Parse a `TOKEN=value` assignment. The value may itself contain `=`.
pub fn parse_assignment(item: &str) -> Result<(String, String), EtiquetaError> {
    let (key, value) = item.split_once('=').ok_or_else(|| {
        EtiquetaError::InvalidJob(format!("expected TOKEN=value, got {:?}", item))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(EtiquetaError::InvalidJob(
            "token names given with --var cannot be empty".into(),
        ));
    }
    Ok((key.to_string(), value.to_string()))
}
