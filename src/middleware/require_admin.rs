//! Admin token enforcement for the REST API
//!
//! Every `/api/v1` route sits behind a single shared bearer token
//! (`ADMIN_API_TOKEN`). When no token is configured the check is skipped,
//! which is only meant for local development.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the admin middleware
#[derive(Clone, Default)]
pub struct AdminAuthState {
    token: Option<Arc<str>>,
}

impl AdminAuthState {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }
}

pub async fn require_admin_middleware(
    State(auth_state): State<AdminAuthState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = auth_state.token.as_deref() else {
        return next.run(request).await;
    };

    let auth_header = match request.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return unauthorized_response("Missing authorization token"),
    };

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(_) => return unauthorized_response("Invalid authorization header encoding"),
    };

    let token = match auth_str.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return unauthorized_response("Authorization header must use Bearer scheme"),
    };

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        tracing::warn!("Rejected admin request with a wrong token");
        return unauthorized_response("Invalid token");
    }

    next.run(request).await
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Generate a 401 Unauthorized response
fn unauthorized_response(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}
