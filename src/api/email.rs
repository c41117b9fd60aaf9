//! Bulk email API handlers

use crate::domain::{
    DispatchAction, DispatchCommand, DispatchOutcome, DispatchResult, DispatchStatus,
    DispatchSummary, ProviderKind, Recipient,
};
use crate::error::Result;
use crate::state::HasServices;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Recorded as the sender when the request names nobody
const UNKNOWN_SENDER: &str = "admin";

/// Request body for a dispatch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    pub subject: Option<String>,
    pub html_content: Option<String>,
    /// Site-side template the body was built from
    pub template_id: Option<String>,
    pub google_sheet_url: Option<String>,
    pub sent_by: Option<String>,
    pub service_provider: Option<ProviderKind>,
    pub provider_template_id: Option<String>,
    #[serde(default)]
    pub action: DispatchAction,
    #[serde(default)]
    pub precomputed_results: Vec<DispatchResult>,
    #[serde(default)]
    pub skip_log: bool,
}

impl From<DispatchRequest> for DispatchCommand {
    fn from(request: DispatchRequest) -> Self {
        DispatchCommand {
            recipients: request.recipients,
            subject: request.subject.unwrap_or_default(),
            html_body: request.html_content.unwrap_or_default(),
            provider: request.service_provider,
            provider_template_id: request.provider_template_id,
            template_id: request.template_id,
            source_sheet_url: request.google_sheet_url,
            sent_by: request
                .sent_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            action: request.action,
            precomputed_results: request.precomputed_results,
            skip_log: request.skip_log,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    /// False only when nobody received the message
    pub success: bool,
    pub status: DispatchStatus,
    pub provider: ProviderKind,
    pub results: Vec<DispatchResult>,
    pub summary: DispatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<i64>,
}

impl From<DispatchOutcome> for DispatchResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            success: outcome.summary.status != DispatchStatus::Failed,
            status: outcome.summary.status,
            provider: outcome.provider,
            results: outcome.results,
            summary: outcome.summary,
            log_id: outcome.log_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportSheetRequest {
    #[validate(length(min = 1, message = "url is required"))]
    pub url: String,
}

/// Send (or log) a bulk email batch
pub async fn dispatch<S: HasServices>(
    State(state): State<S>,
    Json(request): Json<DispatchRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state.dispatch_service().dispatch(request.into()).await?;
    Ok(Json(DispatchResponse::from(outcome)))
}

/// Pull recipients out of a shared Google Sheet
pub async fn import_sheet<S: HasServices>(
    State(state): State<S>,
    Json(request): Json<ImportSheetRequest>,
) -> Result<impl IntoResponse> {
    request.validate()?;
    let import = state.sheet_import_service().import(&request.url).await?;
    Ok(Json(import))
}
