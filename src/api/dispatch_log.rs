//! Dispatch log API handlers

use crate::api::{MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse};
use crate::error::Result;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

/// Most recent dispatches first
pub async fn list<S: HasServices>(
    State(state): State<S>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .dispatch_log_service()
        .list(pagination.offset(), pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        page.entries,
        pagination.page,
        pagination.per_page,
        page.total,
    )))
}

pub async fn get<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let entry = state.dispatch_log_service().get(id).await?;
    Ok(Json(SuccessResponse::new(entry)))
}

pub async fn delete<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.dispatch_log_service().delete(id).await?;
    Ok(Json(MessageResponse::new("Dispatch log deleted")))
}
