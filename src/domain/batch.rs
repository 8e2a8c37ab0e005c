use serde::Serialize;

use super::scheduled_email::ScheduledEmail;
use super::scheduled_email::ScheduledEmailStatus;

/// One entry of the worker's output (§6): the email snapshot as last observed by this
/// worker, paired with the terminal status it ended the run in.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub email_snapshot: ScheduledEmail,
    pub terminal_status: ScheduledEmailStatus,
}

/// Wire shape of one batch entry, exactly as serialized into `WorkerOutput`.
#[derive(Debug, Serialize)]
pub struct WorkerOutputEmail {
    pub email: ScheduledEmail,
    pub status: String,
}

impl From<BatchResult> for WorkerOutputEmail {
    fn from(result: BatchResult) -> Self {
        Self {
            status: result.terminal_status.to_string(),
            email: result.email_snapshot,
        }
    }
}

/// `{emails: [...]}` — the worker's full output for one run (§6).
#[derive(Debug, Serialize)]
pub struct WorkerOutput {
    pub emails: Vec<WorkerOutputEmail>,
}

impl From<Vec<BatchResult>> for WorkerOutput {
    fn from(results: Vec<BatchResult>) -> Self {
        Self { emails: results.into_iter().map(WorkerOutputEmail::from).collect() }
    }
}
