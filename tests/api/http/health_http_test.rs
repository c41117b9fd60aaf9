//! Health endpoints and admin token enforcement

use super::{build_test_router, create_test_config, get_json, TestAppState};
use gamesoc_core::api::health::HealthResponse;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
};
use tower::ServiceExt;

fn state_with_token(token: &str) -> TestAppState {
    let mut config = create_test_config("http://127.0.0.1:9");
    config.admin_api_token = Some(token.to_string());
    TestAppState::with_config(config)
}

#[tokio::test]
async fn test_health() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<HealthResponse>) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().status, "healthy");
}

#[tokio::test]
async fn test_ready() {
    let app = build_test_router(TestAppState::new());

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = build_test_router(TestAppState::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = build_test_router(state_with_token("s3cret"));

    let (status, _): (StatusCode, Option<serde_json::Value>) =
        get_json(&app, "/api/v1/email/logs").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/email/logs")
                .header(AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/v1/email/logs")
                .header(AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_does_not_require_token() {
    let app = build_test_router(state_with_token("s3cret"));

    let (status, _): (StatusCode, Option<HealthResponse>) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
}
