//! The Batch Driver (§4.9): one run's list → fan-out → gather, steps 4-6. Steps 1-3
//! (settings, secrets, shared-component construction) live in `startup::build`; `run_batch`
//! takes the already-assembled components and owns only the concurrency harness (§9 design
//! note: "per-email failure isolation").

use std::sync::Arc;

use futures::future::join_all;

use crate::attachment::BlobStore;
use crate::domain::BatchResult;
use crate::domain::ScheduledEmailStatus;
use crate::domain::WorkerOutput;
use crate::pipeline::Pipeline;
use crate::scheduled_email_client::ScheduledEmailClient;

/// List due emails, spawn one pipeline task per email, and gather every outcome,
/// preserving `list_due`'s ordering (invariant #2, §8). Each pipeline runs in its own
/// `tokio::spawn`ed task so a panic inside one cannot unwind and cancel its siblings
/// (§5 "Fan-out/gather mechanics") — a `JoinError` is folded into a `failed` batch entry
/// exactly like a `LockError` is.
#[tracing::instrument(skip_all)]
pub async fn run_batch<S>(
    scheduled_email_client: Arc<ScheduledEmailClient>,
    pipeline: Pipeline<S>,
) -> Result<WorkerOutput, anyhow::Error>
where
    S: BlobStore + Send + Sync + 'static,
{
    let due = scheduled_email_client.list_due().await?;
    tracing::info!(count = due.len(), "listed due emails");

    let handles: Vec<_> = due
        .iter()
        .map(|email| {
            let pipeline = pipeline.clone();
            let id = email.id;
            tokio::spawn(async move { pipeline.run(id).await })
        })
        .collect();

    let outcomes = join_all(handles).await;

    let results = due
        .into_iter()
        .zip(outcomes)
        .map(|(email, outcome)| match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(lock_error)) => {
                // Open question, resolved in DESIGN.md: a lock failure is recorded as
                // `failed` in the batch summary, but without calling the upstream
                // `fail` endpoint — the worker never actually held the lock it would be
                // relinquishing.
                tracing::warn!(error = %lock_error, "lock failed; recording as failed without a local fail() call");
                BatchResult { email_snapshot: email, terminal_status: ScheduledEmailStatus::Failed }
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "pipeline task panicked or was cancelled");
                BatchResult { email_snapshot: email, terminal_status: ScheduledEmailStatus::Failed }
            }
        })
        .collect::<Vec<_>>();

    Ok(WorkerOutput::from(results))
}
