use super::scheduled_email::ScheduledEmail;

/// Attachment bytes, fetched from the blob store. Order matches `ScheduledEmail::attachments`.
#[derive(Debug, Clone)]
pub struct FetchedAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A `ScheduledEmail` plus everything produced while rendering it. Lives only for the
/// duration of one pipeline run (§3 Lifecycle) — never persisted, never shared across
/// pipelines.
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub source: ScheduledEmail,
    pub subject_rendered: String,
    pub body_rendered: String,
    pub to_header_rendered: Vec<String>,
    pub attachments_with_content: Vec<FetchedAttachment>,
}
