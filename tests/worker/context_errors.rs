use email_worker::domain::ScheduledEmailStatus;
use uuid::Uuid;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::scheduled_email_json;
use crate::helpers::spawn_app;

/// S3: an unsupported URI scheme in `context` fails the email with the exact wording
/// `context_entry`'s caller produces, and never reaches the mail API.
#[tokio::test]
async fn unsupported_context_uri_fails_with_context_wording() {
    let app = spawn_app(None).await;
    let server: &MockServer = &app.server;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/v2/scheduledemail/{id}/lock")))
        .respond_with(ResponseTemplate::new(200).set_body_json(scheduled_email_json(
            id,
            "Hi",
            "Body",
            serde_json::json!({"name": "unsupported#X"}),
            serde_json::json!([]),
            serde_json::json!([]),
        )))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/sandbox.mailgun.org/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/scheduledemail/{id}/fail")))
        .and(body_json(serde_json::json!({
            "details": "Issue when generating context: Unsupported URI 'unsupported#X' for context generation."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(scheduled_email_json(
            id,
            "Hi",
            "Body",
            serde_json::json!({}),
            serde_json::json!([]),
            serde_json::json!([]),
        )))
        .expect(1)
        .mount(server)
        .await;

    let result = app.pipeline.run(id).await.unwrap();

    assert_eq!(result.terminal_status, ScheduledEmailStatus::Failed);
}
