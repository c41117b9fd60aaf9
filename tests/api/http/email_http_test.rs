//! Email dispatch and sheet import HTTP handler tests

use super::{build_test_router, create_test_config, get_json, post_json, TestAppState};
use gamesoc_core::api::PaginatedResponse;
use gamesoc_core::domain::{DispatchLogEntry, DispatchStatus, ProviderKind, SheetImport};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_dispatch_all_sent() {
    let state = TestAppState::new();
    let email = state.email.clone();
    let log_repo = state.log_repo.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "recipients": [
                {"name": "Asha", "email": "asha@uni.test"},
                {"name": "Ben", "email": "ben@uni.test"}
            ],
            "subject": "Hi {{name}}",
            "htmlContent": "<p>Games night, {{ name }}!</p>",
            "sentBy": "secretary@gamesoc.test"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "success");
    assert_eq!(body["provider"], "smtp");
    assert_eq!(body["summary"]["sentCount"], 2);
    assert_eq!(body["logId"], 1);

    let sent = email.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].subject, "Hi Asha");
    assert_eq!(sent[1].html_body, "<p>Games night, Ben!</p>");
    assert_eq!(sent[1].text_body.as_deref(), Some("Games night, Ben!"));

    let logs = log_repo.all().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, DispatchStatus::Success);
    assert_eq!(logs[0].sent_by, "secretary@gamesoc.test");
}

#[tokio::test]
async fn test_dispatch_partial_failure_keeps_order() {
    let state = TestAppState::new();
    state.email.reject("ben@uni.test").await;
    let email = state.email.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "recipients": [
                {"name": "Asha", "email": "asha@uni.test"},
                {"name": "Ben", "email": "ben@uni.test"},
                {"name": "Cat", "email": "not-an-address"}
            ],
            "subject": "Fixtures",
            "htmlContent": "<p>Fixtures are out</p>"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "partial");
    assert_eq!(body["summary"]["failedCount"], 2);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["email"], "asha@uni.test");
    assert_eq!(results[0]["sent"], true);
    assert_eq!(results[1]["sent"], false);
    assert!(results[1]["error"].as_str().unwrap().contains("550"));
    assert_eq!(results[2]["error"], "Invalid email address");

    // the malformed address never reaches the provider
    assert_eq!(email.sent().await.len(), 2);
}

#[tokio::test]
async fn test_dispatch_without_recipients_is_422() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({"recipients": [], "subject": "x", "htmlContent": "<p>x</p>"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.unwrap()["error"].is_string());
}

#[tokio::test]
async fn test_dispatch_transactional_requires_template() {
    let state = TestAppState::new();
    let email = state.email.clone();
    let app = build_test_router(state);

    let (status, _): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "recipients": [{"name": "Asha", "email": "asha@uni.test"}],
            "serviceProvider": "transactional-api"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(email.sent().await.is_empty());
}

#[tokio::test]
async fn test_dispatch_uses_stored_default_provider() {
    let state = TestAppState::new();
    state
        .system_settings_service
        .set_default_provider(ProviderKind::TransactionalApi)
        .await
        .unwrap();
    let email = state.email.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "recipients": [{"name": "Asha", "email": "asha@uni.test"}],
            "subject": "Newsletter",
            "htmlContent": "<p>Hello {{name}}</p>",
            "providerTemplateId": "template_newsletter"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["provider"], "transactional-api");

    let sent = email.sent().await;
    assert_eq!(
        sent[0].provider_template_id.as_deref(),
        Some("template_newsletter")
    );
    // plain-text alternative is only produced for SMTP
    assert!(sent[0].text_body.is_none());
}

#[tokio::test]
async fn test_dispatch_smtp_connection_failure_sends_nothing() {
    let state = TestAppState::new();
    state.email.fail_connection("535 5.7.8 Username and Password not accepted").await;
    let email = state.email.clone();
    let log_repo = state.log_repo.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "recipients": [{"name": "Asha", "email": "asha@uni.test"}],
            "subject": "x",
            "htmlContent": "<p>x</p>"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.unwrap()["error"]
        .as_str()
        .unwrap()
        .contains("app password"));
    assert!(email.sent().await.is_empty());
    assert!(log_repo.all().await.is_empty());
}

#[tokio::test]
async fn test_dispatch_skip_log() {
    let state = TestAppState::new();
    let log_repo = state.log_repo.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "recipients": [{"name": "Asha", "email": "asha@uni.test"}],
            "subject": "x",
            "htmlContent": "<p>x</p>",
            "skipLog": true
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap().get("logId").is_none());
    assert!(log_repo.all().await.is_empty());
}

#[tokio::test]
async fn test_log_only_dispatch_is_listed() {
    let state = TestAppState::new();
    let email = state.email.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/dispatch",
        &json!({
            "action": "log_only",
            "subject": "Sent from the browser",
            "serviceProvider": "emailjs",
            "precomputedResults": [
                {"name": "Asha", "email": "asha@uni.test", "sent": true},
                {"name": "Ben", "email": "ben@uni.test", "sent": false, "error": "quota"}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["status"], "partial");
    assert!(email.sent().await.is_empty());

    let (status, body): (StatusCode, Option<PaginatedResponse<DispatchLogEntry>>) =
        get_json(&app, "/api/v1/email/logs").await;
    assert_eq!(status, StatusCode::OK);
    let page = body.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].provider, ProviderKind::TransactionalApi);
    assert_eq!(page.data[0].error_message.as_deref(), Some("ben@uni.test: quota"));
}

// ============================================================================
// Sheet import
// ============================================================================

const SHARE_URL: &str = "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit#gid=42";

#[tokio::test]
async fn test_import_sheet() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/1AbC-xyz_9/export"))
        .and(query_param("format", "csv"))
        .and(query_param("gid", "42"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string(
                    "Full Name,Email Address,Year\n\
                     Asha Patel,asha@uni.test,2\n\
                     ,nobody@uni.test,1\n\
                     \"Lee, Ben\",ben@uni.test,3\n",
                ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = TestAppState::with_config(create_test_config(&mock_server.uri()));
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<SheetImport>) = post_json(
        &app,
        "/api/v1/email/import-sheet",
        &json!({"url": SHARE_URL}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let import = body.unwrap();
    assert_eq!(import.recipients.len(), 2);
    assert_eq!(import.recipients[1].name, "Lee, Ben");
    assert_eq!(import.skipped_rows, 1);
    assert_eq!(import.headers, vec!["Full Name", "Email Address", "Year"]);
}

#[tokio::test]
async fn test_import_sheet_missing_columns_lists_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/d/1AbC-xyz_9/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string("Handle,Discord\nasha,asha#1\n"),
        )
        .mount(&mock_server)
        .await;

    let state = TestAppState::with_config(create_test_config(&mock_server.uri()));
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/import-sheet",
        &json!({"url": SHARE_URL}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body.unwrap()["details"]["headers"], json!(["Handle", "Discord"]));
}

#[tokio::test]
async fn test_import_sheet_private_sheet_is_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>Sign in</html>", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let state = TestAppState::with_config(create_test_config(&mock_server.uri()));
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/import-sheet",
        &json!({"url": SHARE_URL}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.unwrap()["error"]
        .as_str()
        .unwrap()
        .contains("not shared publicly"));
}

#[tokio::test]
async fn test_import_sheet_rejects_other_hosts() {
    let app = build_test_router(TestAppState::new());

    let (status, _): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/email/import-sheet",
        &json!({"url": "https://example.com/spreadsheets/d/abc/edit"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _): (StatusCode, Option<Value>) =
        post_json(&app, "/api/v1/email/import-sheet", &json!({"url": ""})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
