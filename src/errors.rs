//! Typed error taxonomy, one variant set per component seam (§4, §7 of the design doc).
//!
//! Every leaf error carries enough context to reproduce the exact `details` wording the
//! pipeline records upstream; `PipelineError::detail()` is the single place that wording
//! is assembled, so the strings in `pipeline.rs` and in tests stay in sync.

use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum SecretStoreError {
    #[error("secret store request failed: {0}")]
    Transport(String),
}

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("failed to refresh auth token: {0}")]
    Refresh(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl ApiError {
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport { url: url.into(), message: message.to_string() }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UriError {
    #[error("Unsupported URI '{0}' for context generation.")]
    UnsupportedUriContext(String),
    #[error("Unsupported URI '{0}'.")]
    Unsupported(String),
    #[error("Unsupported scalar type '{0}'.")]
    UnsupportedScalarType(String),
    #[error("could not parse '{fragment}' as {kind}")]
    ScalarParse { kind: &'static str, fragment: String },
    #[error("field '{field}' missing from model")]
    MissingField { field: String },
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read email context")]
    Context,
    #[error("Failed to read email recipients")]
    Recipients,
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("{0}")]
    TemplateSyntax(String),
}

#[derive(thiserror::Error, Debug)]
pub enum AttachmentError {
    #[error("could not fetch attachment {filename:?} (key {blob_key:?}): {source}")]
    Fetch {
        filename: String,
        blob_key: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("mail API returned status {status}: {body}")]
    NonSuccess { status: u16, body: String },
    #[error("mail API request failed: {0}")]
    Transport(String),
}

/// Raised only by step 4.8.1 (lock). Never recorded as a local `fail()` call — see
/// the Open Questions decision in DESIGN.md.
#[derive(thiserror::Error, Debug)]
#[error("could not lock email {id}: {source}")]
pub struct LockError {
    pub id: Uuid,
    #[source]
    pub source: ApiError,
}

/// The union of everything that can terminate a pipeline after a successful lock.
/// `detail()` renders the exact upstream-facing wording for each case.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Issue when generating context: {0}")]
    Context(UriError),
    #[error("Issue when generating email {id} recipients: {source}")]
    Recipients { id: Uuid, source: UriError },
    #[error("Failed to render email {id}. Error: {source}")]
    Render { id: Uuid, source: RenderError },
    #[error("Failed to download attachments for email {id}. Error: {source}")]
    Attachment { id: Uuid, source: AttachmentError },
    #[error("Failed to send email {id}. Error: {source}")]
    Mail { id: Uuid, source: MailError },
}

impl PipelineError {
    /// The exact string recorded via `fail(id, details)`.
    pub fn detail(&self) -> String { self.to_string() }
}
