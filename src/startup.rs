//! Bootstraps the worker's shared components from `Settings` (§4.9 steps 1-3): secret-store
//! reads for credentials, a shared HTTP client, the token cache, and the scheduled-email
//! client. Kept separate from `main` for the same reason the web version of this code kept
//! an `Application::build` here: a test can assemble a `WorkerComponents` against a mock
//! server instead of live AWS/Mailgun/the scheduled-email API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::Secret;

use crate::attachment::AttachmentFetcher;
use crate::attachment::S3BlobStore;
use crate::configuration::Settings;
use crate::mail::MailCredentials;
use crate::mail::MailDispatcher;
use crate::scheduled_email_client::ScheduledEmailClient;
use crate::secrets::read_or_default;
use crate::secrets::SecretStore;
use crate::token::TokenCache;
use crate::token::TokenCredentials;

/// Everything a `Pipeline` needs, assembled once per run and shared across every
/// pipeline task (§5 "Shared resources").
pub struct WorkerComponents {
    pub scheduled_email_client: Arc<ScheduledEmailClient>,
    pub token_cache: Arc<TokenCache>,
    pub attachment_fetcher: Arc<AttachmentFetcher<S3BlobStore>>,
    pub mail_dispatcher: Arc<MailDispatcher>,
}

/// Build `WorkerComponents` (§4.9 steps 1-3). `mail_base_url` is a parameter rather than
/// hardcoded `MAILGUN_BASE_URL` so integration tests can point the dispatcher at a mock
/// server; production callers pass `mail::MAILGUN_BASE_URL`.
pub async fn build(
    settings: &Settings,
    secret_store: &impl SecretStore,
    s3_client: aws_sdk_s3::Client,
    mail_base_url: &str,
) -> Result<WorkerComponents, anyhow::Error> {
    let mailgun_key = read_or_default(secret_store, &settings.secret_path("mailgun_key"), "").await;
    let mailgun_sender_domain =
        read_or_default(secret_store, &settings.secret_path("mailgun_sender_domain"), "").await;
    let token_username = read_or_default(secret_store, &settings.secret_path("token_username"), "").await;
    let token_password = read_or_default(secret_store, &settings.secret_path("token_password"), "").await;
    let s3_bucket = read_or_default(secret_store, &settings.secret_path("s3_bucket"), "").await;

    let http_client = Client::builder().timeout(Duration::from_secs(settings.http_timeout_seconds)).build()?;

    let token_cache = Arc::new(TokenCache::new(
        http_client.clone(),
        format!("{}/auth/login/", settings.api_base_url),
        TokenCredentials { username: token_username, password: Secret::new(token_password) },
        chrono::Duration::zero(),
    ));

    let scheduled_email_client = Arc::new(ScheduledEmailClient::new(
        http_client.clone(),
        settings.api_base_url.clone(),
        Arc::clone(&token_cache),
    ));

    let blob_store = S3BlobStore::new(s3_client, s3_bucket);
    let attachment_fetcher = Arc::new(AttachmentFetcher::new(blob_store));

    let mail_dispatcher = Arc::new(MailDispatcher::new(
        http_client,
        mail_base_url.to_string(),
        MailCredentials { sender_domain: mailgun_sender_domain, api_key: Secret::new(mailgun_key) },
        settings.overwrite_outgoing_emails.clone(),
    ));

    Ok(WorkerComponents { scheduled_email_client, token_cache, attachment_fetcher, mail_dispatcher })
}
