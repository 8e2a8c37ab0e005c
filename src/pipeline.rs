//! The Per-Email Pipeline (§4.8): lock → parse → resolve → render → fetch → send →
//! succeed/fail, for one email. Every error after a successful lock is converted to a
//! `fail(id, details)` call rather than propagated (§7's central rule) — `run` itself
//! therefore only ever returns `Err` for a *lock* failure, which the driver, not this
//! pipeline, is responsible for recording in the batch summary (§9 open question).

use std::sync::Arc;

use tera::Context;
use uuid::Uuid;

use crate::attachment::AttachmentFetcher;
use crate::attachment::BlobStore;
use crate::domain::parse_context;
use crate::domain::parse_recipient_links;
use crate::domain::BatchResult;
use crate::domain::ContextLink;
use crate::domain::RecipientLink;
use crate::domain::ScheduledEmail;
use crate::domain::ScheduledEmailStatus;
use crate::errors::LockError;
use crate::errors::PipelineError;
use crate::mail::MailDispatcher;
use crate::scheduled_email_client::ScheduledEmailClient;
use crate::token::TokenCache;
use crate::uri::context_entry;
use crate::uri::model_field;
use crate::uri::scalar;
use crate::uri::ContextEntryUri;
use crate::uri::Uri;

pub struct Pipeline<S> {
    scheduled_email_client: Arc<ScheduledEmailClient>,
    token_cache: Arc<TokenCache>,
    attachment_fetcher: Arc<AttachmentFetcher<S>>,
    mail_dispatcher: Arc<MailDispatcher>,
}

impl<S> Clone for Pipeline<S> {
    fn clone(&self) -> Self {
        Self {
            scheduled_email_client: Arc::clone(&self.scheduled_email_client),
            token_cache: Arc::clone(&self.token_cache),
            attachment_fetcher: Arc::clone(&self.attachment_fetcher),
            mail_dispatcher: Arc::clone(&self.mail_dispatcher),
        }
    }
}

impl<S: BlobStore + Send + Sync + 'static> Pipeline<S> {
    pub fn new(
        scheduled_email_client: Arc<ScheduledEmailClient>,
        token_cache: Arc<TokenCache>,
        attachment_fetcher: Arc<AttachmentFetcher<S>>,
        mail_dispatcher: Arc<MailDispatcher>,
    ) -> Self {
        Self { scheduled_email_client, token_cache, attachment_fetcher, mail_dispatcher }
    }

    /// Step 1: lock, then run the rest of the pipeline. A lock failure is the one
    /// case that returns `Err` rather than a `BatchResult` — the caller decides how
    /// to record it (§9 open question decision in DESIGN.md).
    #[tracing::instrument(skip_all, fields(email.id = %id))]
    pub async fn run(&self, id: Uuid) -> Result<BatchResult, LockError> {
        let locked = self.scheduled_email_client.lock(id).await.map_err(|source| LockError { id, source })?;
        tracing::info!("locked email");

        match self.process(&locked).await {
            Ok(result) => Ok(result),
            Err(err) => {
                let details = err.detail();
                tracing::warn!(detail = %details, "email pipeline failed");
                let snapshot = match self.scheduled_email_client.fail(id, &details).await {
                    Ok(snapshot) => snapshot,
                    Err(source) => {
                        tracing::error!(error = %source, "failed to record failure upstream");
                        locked
                    }
                };
                Ok(BatchResult { email_snapshot: snapshot, terminal_status: ScheduledEmailStatus::Failed })
            }
        }
    }

    async fn process(&self, locked: &ScheduledEmail) -> Result<BatchResult, PipelineError> {
        let id = locked.id;

        // Step 2: parse embedded JSON against the recipient/context schemas.
        let context_links = parse_context(&locked.context)?;
        let recipient_links = parse_recipient_links(&locked.to_header_context)?;

        // Step 3: obtain a token eagerly so a refresh failure is reported here, with
        // the right wording, rather than surfacing later as a bare HTTP error.
        self.token_cache.get_token().await?;

        // Step 4: resolve context entries. Sequential across keys (mirrors the
        // upstream behavior this worker replaces); concurrent *within* a list entry,
        // per `context_entry`'s own contract.
        let mut context = Context::new();
        for (key, link) in &context_links {
            let entry_uri = to_entry_uri(link).map_err(PipelineError::Context)?;
            let resolved = context_entry(&entry_uri, self.scheduled_email_client.as_ref())
                .await
                .map_err(PipelineError::Context)?;
            context.insert(key, &resolved.into_json());
        }

        // Step 5: resolve recipients.
        let mut recipients = Vec::with_capacity(recipient_links.len());
        for link in &recipient_links {
            let resolved = resolve_recipient(link, self.scheduled_email_client.as_ref())
                .await
                .map_err(|source| PipelineError::Recipients { id, source })?;
            recipients.push(resolved);
        }

        // Step 6: render subject, body (through markdown), and recipients.
        let rendered =
            crate::render::render_email(locked, &context, recipients).map_err(|source| PipelineError::Render { id, source })?;

        // Step 7: fetch attachments.
        let attachments_with_content = self
            .attachment_fetcher
            .fetch_all(&locked.attachments)
            .await
            .map_err(|source| PipelineError::Attachment { id, source })?;
        let rendered = crate::domain::RenderedEmail { attachments_with_content, ..rendered };

        // Step 8: send.
        let mail_response =
            self.mail_dispatcher.send(&rendered).await.map_err(|source| PipelineError::Mail { id, source })?;

        // Step 9: succeed.
        let details = format!("Email sent successfully. Mailgun response: {mail_response:?}");
        let snapshot = self.scheduled_email_client.succeed(id, &details).await.unwrap_or_else(|_| locked.clone());
        tracing::info!("sent email");
        Ok(BatchResult { email_snapshot: snapshot, terminal_status: ScheduledEmailStatus::Succeeded })
    }
}

fn to_entry_uri(link: &ContextLink) -> Result<ContextEntryUri, crate::errors::UriError> {
    match link {
        ContextLink::Single(raw) => Ok(ContextEntryUri::Single(Uri::parse_for_context(raw)?)),
        ContextLink::List(raws) => {
            let uris = raws.iter().map(|raw| Uri::parse_for_context(raw)).collect::<Result<Vec<_>, _>>()?;
            Ok(ContextEntryUri::List(uris))
        }
    }
}

async fn resolve_recipient(
    link: &RecipientLink,
    fetcher: &impl crate::uri::ModelFetcher,
) -> Result<String, crate::errors::UriError> {
    match link {
        RecipientLink::SingleValue { value_uri } => {
            let uri = Uri::parse(value_uri)?;
            Ok(scalar(&uri)?.to_string())
        }
        RecipientLink::SingleProperty { api_uri, property } => {
            let uri = Uri::parse(api_uri)?;
            model_field(&uri, property, fetcher).await
        }
    }
}
