//! Email provider settings HTTP handler tests

use super::{build_test_router, delete_json, get_json, post_json, put_json, TestAppState};
use gamesoc_core::api::SuccessResponse;
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_default_provider_falls_back_to_smtp() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<SuccessResponse<Value>>) =
        get_json(&app, "/api/v1/settings/email/provider").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().data["provider"], "smtp");
}

#[tokio::test]
async fn test_update_then_get_default_provider() {
    let state = TestAppState::new();
    let settings_repo = state.settings_repo.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<SuccessResponse<Value>>) = put_json(
        &app,
        "/api/v1/settings/email/provider",
        &json!({"provider": "emailjs"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().data["provider"], "transactional-api");

    let (_, body): (StatusCode, Option<SuccessResponse<Value>>) =
        get_json(&app, "/api/v1/settings/email/provider").await;
    assert_eq!(body.unwrap().data["provider"], "transactional-api");

    assert_eq!(
        settings_repo.stored_value("email", "default_provider").await,
        Some(json!("transactional-api"))
    );
}

#[tokio::test]
async fn test_update_unknown_provider_is_rejected() {
    let app = build_test_router(TestAppState::new());

    let (status, _): (StatusCode, Option<Value>) = put_json(
        &app,
        "/api/v1/settings/email/provider",
        &json!({"provider": "carrier-pigeon"}),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_reset_default_provider() {
    let state = TestAppState::new();
    let settings_repo = state.settings_repo.clone();
    let app = build_test_router(state);

    let _: (StatusCode, Option<Value>) = put_json(
        &app,
        "/api/v1/settings/email/provider",
        &json!({"provider": "transactional-api"}),
    )
    .await;

    let (status, body): (StatusCode, Option<SuccessResponse<Value>>) =
        delete_json(&app, "/api/v1/settings/email/provider").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().data["provider"], "smtp");
    assert!(settings_repo
        .stored_value("email", "default_provider")
        .await
        .is_none());

    let (_, body): (StatusCode, Option<SuccessResponse<Value>>) =
        get_json(&app, "/api/v1/settings/email/provider").await;
    assert_eq!(body.unwrap().data["provider"], "smtp");
}

#[tokio::test]
async fn test_connection_check() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/settings/email/test-connection?provider=smtp",
        &json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["provider"], "smtp");
    assert_eq!(body["credentialsVerified"], true);
}

#[tokio::test]
async fn test_connection_check_transactional_reports_unverified_credentials() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/settings/email/test-connection?provider=transactional-api",
        &json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["provider"], "transactional-api");
    assert_eq!(body["credentialsVerified"], false);
    assert!(body["message"].as_str().unwrap().contains("first send"));
}

#[tokio::test]
async fn test_connection_check_reports_hint() {
    let state = TestAppState::new();
    state.email.fail_connection("535 authentication failed").await;
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) =
        post_json(&app, "/api/v1/settings/email/test-connection", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body = body.unwrap();
    assert!(body["error"].as_str().unwrap().contains("app password"));
    assert!(body["details"].as_str().unwrap().contains("535"));
}

#[tokio::test]
async fn test_send_test_email_is_not_logged() {
    let state = TestAppState::new();
    let email = state.email.clone();
    let log_repo = state.log_repo.clone();
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/settings/email/test-email",
        &json!({"toEmail": "asha@uni.test"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Test email sent to asha@uni.test");

    let sent = email.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html_body.contains("Hi Test Recipient"));
    assert!(log_repo.all().await.is_empty());
}

#[tokio::test]
async fn test_send_test_email_rejects_bad_address() {
    let app = build_test_router(TestAppState::new());

    let (status, _): (StatusCode, Option<Value>) = post_json(
        &app,
        "/api/v1/settings/email/test-email",
        &json!({"toEmail": "asha"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
