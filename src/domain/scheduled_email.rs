use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Closed set of states the upstream API assigns a `ScheduledEmail`. The worker never
/// writes this field directly; it only requests transitions via the scheduled-email
/// client and reads back whatever the upstream API recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledEmailStatus {
    Scheduled,
    Locked,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl ScheduledEmailStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Cancelled
        )
    }
}

impl std::fmt::Display for ScheduledEmailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::Locked => "locked",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One attachment reference as carried on a `ScheduledEmail`. The optional presigned-url
/// fields the upstream API sometimes sends along are intentionally not modeled here —
/// the worker always re-downloads via the blob store, ignoring them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub filename: String,
    pub blob_key: String,
}

/// Immutable snapshot of an upstream `ScheduledEmail` record, as returned by every
/// scheduled-email client call (list, get, lock, fail, succeed all return the same shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEmail {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub state: ScheduledEmailStatus,

    pub to_header: Vec<String>,
    pub cc_header: Vec<String>,
    pub bcc_header: Vec<String>,
    pub from_header: String,
    pub reply_to_header: String,

    pub subject: String,
    pub body: String,

    /// Recipient links, still raw JSON at this point — validated into `RecipientLink`
    /// at pipeline step 4.8.2.
    pub to_header_context: serde_json::Value,
    /// Template-variable → URI(s), still raw JSON — validated into `ContextLink` at
    /// pipeline step 4.8.2.
    pub context: serde_json::Value,

    pub attachments: Vec<AttachmentRef>,

    pub template: Option<String>,
}
