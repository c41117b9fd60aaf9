//! System settings API handlers

use crate::api::SuccessResponse;
use crate::domain::{DispatchCommand, DispatchStatus, ProviderKind, Recipient};
use crate::error::{AppError, Result};
use crate::state::HasServices;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

/// Default provider as exchanged with the admin UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSetting {
    pub provider: ProviderKind,
}

/// Optional provider override for connection checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderQuery {
    pub provider: Option<ProviderKind>,
}

/// Response for connection checks and test emails
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailResponse {
    pub success: bool,
    pub message: String,
    pub provider: ProviderKind,
    /// False when only the configuration could be checked
    pub credentials_verified: bool,
}

/// Request body for sending test email
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTestEmailRequest {
    #[serde(alias = "to_email")]
    pub to_email: String,
    pub provider: Option<ProviderKind>,
    pub provider_template_id: Option<String>,
}

pub async fn get_default_provider<S: HasServices>(
    State(state): State<S>,
) -> Result<impl IntoResponse> {
    let provider = state.system_settings_service().get_default_provider().await?;
    Ok(Json(SuccessResponse::new(ProviderSetting { provider })))
}

pub async fn update_default_provider<S: HasServices>(
    State(state): State<S>,
    Json(request): Json<ProviderSetting>,
) -> Result<impl IntoResponse> {
    let provider = state
        .system_settings_service()
        .set_default_provider(request.provider)
        .await?;
    Ok(Json(SuccessResponse::new(ProviderSetting { provider })))
}

/// Drop the stored default so the built-in one applies
pub async fn reset_default_provider<S: HasServices>(
    State(state): State<S>,
) -> Result<impl IntoResponse> {
    let provider = state
        .system_settings_service()
        .reset_default_provider()
        .await?;
    Ok(Json(SuccessResponse::new(ProviderSetting { provider })))
}

/// Test email connection (verify credentials)
pub async fn test_email_connection<S: HasServices>(
    State(state): State<S>,
    Query(query): Query<ProviderQuery>,
) -> Result<impl IntoResponse> {
    let provider = state
        .dispatch_service()
        .verify_provider(query.provider)
        .await?;

    let credentials_verified = provider.verifies_credentials();
    let message = if credentials_verified {
        "Connection successful".to_string()
    } else {
        "Configuration is valid. Credentials cannot be checked in advance and are verified on \
         the first send"
            .to_string()
    };

    Ok(Json(TestEmailResponse {
        success: true,
        message,
        provider,
        credentials_verified,
    }))
}

/// Send a single unlogged test email
pub async fn send_test_email<S: HasServices>(
    State(state): State<S>,
    Json(request): Json<SendTestEmailRequest>,
) -> Result<impl IntoResponse> {
    if !request.to_email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let outcome = state
        .dispatch_service()
        .dispatch(DispatchCommand {
            recipients: vec![Recipient::new("Test Recipient", request.to_email.clone())],
            subject: "GameSoc test email".to_string(),
            html_body: "<p>Hi {{name}}, this is a test email from the GameSoc back office.</p>"
                .to_string(),
            provider: request.provider,
            provider_template_id: request.provider_template_id,
            sent_by: "settings-test".to_string(),
            skip_log: true,
            ..Default::default()
        })
        .await?;

    let message = match outcome.results.first() {
        Some(result) if result.sent => format!("Test email sent to {}", request.to_email),
        Some(result) => result
            .error
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string()),
        None => "Nothing was sent".to_string(),
    };

    let success = outcome.summary.status == DispatchStatus::Success;
    Ok(Json(TestEmailResponse {
        success,
        message,
        provider: outcome.provider,
        credentials_verified: success,
    }))
}
