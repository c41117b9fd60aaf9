//! Dispatch log HTTP handler tests

use super::{build_test_router, delete_json, get_json, TestAppState};
use crate::api::create_test_log_entry;
use gamesoc_core::api::{MessageResponse, PaginatedResponse, SuccessResponse};
use gamesoc_core::domain::{DispatchLogEntry, DispatchStatus};
use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_list_logs_newest_first() {
    let state = TestAppState::new();
    for id in 1..=3 {
        state
            .log_repo
            .add_entry(create_test_log_entry(id, &format!("Newsletter {}", id)))
            .await;
    }
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<PaginatedResponse<DispatchLogEntry>>) =
        get_json(&app, "/api/v1/email/logs").await;

    assert_eq!(status, StatusCode::OK);
    let response = body.unwrap();
    assert_eq!(response.pagination.total, 3);
    assert_eq!(response.pagination.page, 1);
    let ids: Vec<i64> = response.data.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn test_list_logs_pagination() {
    let state = TestAppState::new();
    for id in 1..=25 {
        state
            .log_repo
            .add_entry(create_test_log_entry(id, "Weekly"))
            .await;
    }
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<PaginatedResponse<DispatchLogEntry>>) =
        get_json(&app, "/api/v1/email/logs?page=3&per_page=10").await;

    assert_eq!(status, StatusCode::OK);
    let response = body.unwrap();
    assert_eq!(response.data.len(), 5);
    assert_eq!(response.pagination.total_pages, 3);
    assert_eq!(response.data[0].id, 5);
}

#[tokio::test]
async fn test_list_logs_rejects_page_zero() {
    let app = build_test_router(TestAppState::new());

    let (status, _): (StatusCode, Option<Value>) =
        get_json(&app, "/api/v1/email/logs?page=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_logs_rejects_out_of_range_page() {
    let app = build_test_router(TestAppState::new());

    let (status, _): (StatusCode, Option<Value>) =
        get_json(&app, "/api/v1/email/logs?page=9223372036854775807").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_log() {
    let state = TestAppState::new();
    state
        .log_repo
        .add_entry(create_test_log_entry(7, "LAN party"))
        .await;
    let app = build_test_router(state);

    let (status, body): (StatusCode, Option<SuccessResponse<DispatchLogEntry>>) =
        get_json(&app, "/api/v1/email/logs/7").await;

    assert_eq!(status, StatusCode::OK);
    let entry = body.unwrap().data;
    assert_eq!(entry.subject, "LAN party");
    assert_eq!(entry.status, DispatchStatus::Partial);
    assert_eq!(entry.recipients_data.len(), 2);
}

#[tokio::test]
async fn test_get_missing_log_is_404() {
    let app = build_test_router(TestAppState::new());

    let (status, _): (StatusCode, Option<Value>) = get_json(&app, "/api/v1/email/logs/99").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_log_invalidates_cached_listing() {
    let state = TestAppState::new();
    state
        .log_repo
        .add_entry(create_test_log_entry(1, "Old"))
        .await;
    let app = build_test_router(state);

    // warm the listing cache
    let (_, body): (StatusCode, Option<PaginatedResponse<DispatchLogEntry>>) =
        get_json(&app, "/api/v1/email/logs").await;
    assert_eq!(body.unwrap().pagination.total, 1);

    let (status, body): (StatusCode, Option<MessageResponse>) =
        delete_json(&app, "/api/v1/email/logs/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().message, "Dispatch log deleted");

    let (_, body): (StatusCode, Option<PaginatedResponse<DispatchLogEntry>>) =
        get_json(&app, "/api/v1/email/logs").await;
    assert_eq!(body.unwrap().pagination.total, 0);

    let (status, _): (StatusCode, Option<Value>) =
        delete_json(&app, "/api/v1/email/logs/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
