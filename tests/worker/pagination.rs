use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::scheduled_email_json;
use crate::helpers::spawn_app;

/// S6 (default cap): a server that happily returns 200 forever is still bounded by
/// `list_due`'s built-in safety cap (`DEFAULT_MAX_PAGES = 10`), with no error raised.
/// `scheduled_email_client.rs`'s own unit tests cover a custom, smaller cap directly
/// against `get_paginated`; this exercises the production entry point `list_due` uses.
#[tokio::test]
async fn list_due_stops_at_the_default_safety_cap() {
    let app = spawn_app(None).await;
    let server: &MockServer = &app.server;

    Mock::given(method("GET"))
        .and(path("/v2/scheduledemail/scheduled_to_run"))
        .respond_with(move |_: &wiremock::Request| {
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"results": [scheduled_email_json(
                    Uuid::new_v4(),
                    "Hi",
                    "Body",
                    serde_json::json!({}),
                    serde_json::json!([]),
                    serde_json::json!([]),
                )]}))
        })
        .mount(server)
        .await;

    let emails = app.scheduled_email_client.list_due().await.unwrap();

    assert_eq!(emails.len(), 10);
}
