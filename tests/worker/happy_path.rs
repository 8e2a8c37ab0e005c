use email_worker::domain::ScheduledEmailStatus;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::scheduled_email_json;
use crate::helpers::spawn_app;

/// S1: one email with a scalar context value, a recipient resolved from a remote
/// model's field, and one attachment, ends in `succeeded` with the mail API seeing the
/// resolved recipient, rendered subject, and HTML body.
#[tokio::test]
async fn happy_path_locks_resolves_renders_and_succeeds() {
    let app = spawn_app(None).await;
    let server: &MockServer = &app.server;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/v2/scheduledemail/{id}/lock")))
        .respond_with(ResponseTemplate::new(200).set_body_json(scheduled_email_json(
            id,
            "Hi {{ name }}",
            "Welcome, {{ name }}!",
            serde_json::json!({"name": "value:str#Alice"}),
            serde_json::json!([{"api_uri": "api:person#1", "property": "email"}]),
            serde_json::json!([{"filename": "c.pdf", "blob_key": "k"}]),
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/person/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"email": "a@x.org"})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/sandbox.mailgun.org/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"<m>"}"#))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v2/scheduledemail/{id}/succeed")))
        .respond_with(ResponseTemplate::new(200).set_body_json(scheduled_email_json(
            id,
            "Hi {{ name }}",
            "Welcome, {{ name }}!",
            serde_json::json!({}),
            serde_json::json!([]),
            serde_json::json!([]),
        )))
        .expect(1)
        .mount(server)
        .await;

    let result = app.pipeline.run(id).await.unwrap();

    assert_eq!(result.terminal_status, ScheduledEmailStatus::Succeeded);
}
