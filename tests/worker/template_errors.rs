use email_worker::domain::ScheduledEmailStatus;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::scheduled_email_json;
use crate::helpers::spawn_app;

/// S4: a malformed subject template fails the email at the render step and never
/// reaches the mail API.
#[tokio::test]
async fn template_syntax_error_fails_before_sending() {
    let app = spawn_app(None).await;
    let server: &MockServer = &app.server;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/v2/scheduledemail/{id}/lock")))
        .respond_with(ResponseTemplate::new(200).set_body_json(scheduled_email_json(
            id,
            "{{ x }",
            "Body",
            serde_json::json!({}),
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
        .respond_with(ResponseTemplate::new(200).set_body_json(scheduled_email_json(
            id,
            "{{ x }",
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
