//! The Mail Transfer Dispatcher (§4.7): POSTs a fully-rendered message, with
//! attachments and the recipient override applied, to the mail API.

use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;

use crate::domain::RenderedEmail;
use crate::errors::MailError;

pub const MAILGUN_BASE_URL: &str = "https://api.mailgun.net";

pub struct MailCredentials {
    pub sender_domain: String,
    pub api_key: Secret<String>,
}

pub struct MailDispatcher {
    client: Client,
    /// Mailgun's API host, e.g. `https://api.mailgun.net`. A constructor parameter
    /// (not hardcoded) so tests can point it at a local mock server, the same way
    /// `ScheduledEmailClient` takes `api_base_url`.
    base_url: String,
    credentials: MailCredentials,
    /// The test/staging safety valve (§4.7, §6 `OVERWRITE_OUTGOING_EMAILS`). `Some`
    /// only when the configured value is non-empty.
    overwrite_outgoing_emails: Option<String>,
}

impl MailDispatcher {
    pub fn new(
        client: Client,
        base_url: String,
        credentials: MailCredentials,
        overwrite_outgoing_emails: Option<String>,
    ) -> Self {
        Self { client, base_url, credentials, overwrite_outgoing_emails }
    }

    fn recipients(&self, email: &RenderedEmail) -> (Vec<String>, Vec<String>, Vec<String>) {
        match &self.overwrite_outgoing_emails {
            Some(overwrite) => (vec![overwrite.clone()], Vec::new(), Vec::new()),
            None => {
                (email.to_header_rendered.clone(), email.source.cc_header.clone(), email.source.bcc_header.clone())
            }
        }
    }

    /// `POST /v3/{sender_domain}/messages` (§4.7). Returns the response body on
    /// success — the pipeline folds it into the `succeed` details for traceability.
    pub async fn send(&self, email: &RenderedEmail) -> Result<String, MailError> {
        let url = format!("{}/v3/{}/messages", self.base_url, self.credentials.sender_domain);
        let (to, cc, bcc) = self.recipients(email);

        let mut form = Form::new()
            .text("from", email.source.from_header.clone())
            .text("h:Reply-To", email.source.reply_to_header.clone())
            .text("subject", email.subject_rendered.clone())
            .text("html", email.body_rendered.clone());

        for address in to {
            form = form.text("to", address);
        }
        for address in cc {
            form = form.text("cc", address);
        }
        for address in bcc {
            form = form.text("bcc", address);
        }
        for attachment in &email.attachments_with_content {
            let part = Part::bytes(attachment.bytes.clone()).file_name(attachment.filename.clone());
            form = form.part("attachment", part);
        }

        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(self.credentials.api_key.expose_secret()))
            .multipart(form)
            .send()
            .await
            .map_err(|source| MailError::Transport(source.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MailError::NonSuccess { status: status.as_u16(), body });
        }
        Ok(body)
    }
}
