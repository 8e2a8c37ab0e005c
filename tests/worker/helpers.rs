use std::sync::Arc;

use chrono::Duration;
use chrono::Utc;
use email_worker::attachment::AttachmentFetcher;
use email_worker::attachment::BlobStore;
use email_worker::mail::MailCredentials;
use email_worker::mail::MailDispatcher;
use email_worker::pipeline::Pipeline;
use email_worker::scheduled_email_client::ScheduledEmailClient;
use email_worker::telemetry::get_subscriber;
use email_worker::telemetry::init_subscriber;
use email_worker::token::TokenCache;
use email_worker::token::TokenCredentials;
use once_cell::sync::Lazy;
use secrecy::Secret;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Init a static subscriber once per test binary. Opt in to verbose output with
/// `TEST_LOG=true cargo test --test worker | bunyan`.
static TRACING: Lazy<()> = Lazy::new(|| match std::env::var("TEST_LOG") {
    Ok(_) => init_subscriber(get_subscriber("test", "debug", std::io::stdout)),
    Err(_) => init_subscriber(get_subscriber("test", "debug", std::io::sink)),
});

/// Hands back canned bytes for every key; good enough since the worker never inspects
/// attachment content, only relays it.
pub struct FakeBlobStore {
    pub bytes: Vec<u8>,
}

impl BlobStore for FakeBlobStore {
    async fn get_object(&self, _key: &str) -> Result<Vec<u8>, anyhow::Error> {
        Ok(self.bytes.clone())
    }
}

/// One mock server plays both the scheduled-email API and the mail transfer API, the
/// same way the single `wiremock` server in the crate's own unit tests does — the two
/// never collide since `ScheduledEmailClient` and `MailDispatcher` hit disjoint paths.
pub struct TestApp {
    pub server: MockServer,
    pub scheduled_email_client: Arc<ScheduledEmailClient>,
    pub pipeline: Pipeline<FakeBlobStore>,
}

pub async fn spawn_app(overwrite_outgoing_emails: Option<&str>) -> TestApp {
    Lazy::force(&TRACING);

    let server = MockServer::start().await;
    mount_auth(&server).await;

    let http_client = reqwest::Client::new();
    let token_cache = Arc::new(TokenCache::new(
        http_client.clone(),
        format!("{}/auth/login/", server.uri()),
        TokenCredentials { username: "user".into(), password: Secret::new("pass".into()) },
        Duration::zero(),
    ));
    let scheduled_email_client =
        Arc::new(ScheduledEmailClient::new(http_client.clone(), server.uri(), Arc::clone(&token_cache)));
    let attachment_fetcher = Arc::new(AttachmentFetcher::new(FakeBlobStore { bytes: vec![0xBE, 0xEF] }));
    let mail_dispatcher = Arc::new(MailDispatcher::new(
        http_client,
        server.uri(),
        MailCredentials { sender_domain: "sandbox.mailgun.org".into(), api_key: Secret::new("key".into()) },
        overwrite_outgoing_emails.map(str::to_string),
    ));

    let pipeline =
        Pipeline::new(Arc::clone(&scheduled_email_client), Arc::clone(&token_cache), attachment_fetcher, mail_dispatcher);

    TestApp { server, scheduled_email_client, pipeline }
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "expiry": (Utc::now() + Duration::days(1)).to_rfc3339(),
            "token": "tok",
        })))
        .mount(server)
        .await;
}

/// One `ScheduledEmail` JSON body, shaped to match whatever the test mounts for
/// lock/fail/succeed — every one of those endpoints returns the same shape (§4.3).
#[allow(clippy::too_many_arguments)]
pub fn scheduled_email_json(
    id: Uuid,
    subject: &str,
    body: &str,
    context: serde_json::Value,
    to_header_context: serde_json::Value,
    attachments: serde_json::Value,
) -> serde_json::Value {
    let now = Utc::now().to_rfc3339();
    serde_json::json!({
        "id": id,
        "created_at": now,
        "last_updated_at": now,
        "scheduled_at": now,
        "state": "locked",
        "to_header": [],
        "cc_header": [],
        "bcc_header": [],
        "from_header": "team@example.com",
        "reply_to_header": "reply@example.com",
        "subject": subject,
        "body": body,
        "to_header_context": to_header_context,
        "context": context,
        "attachments": attachments,
        "template": null,
    })
}
