//! Transactional email API provider (EmailJS REST endpoint)
//!
//! The provider renders its own template server-side, so the request only
//! carries template parameters. `html_body` is passed through as `message`.

use super::provider::{EmailProvider, EmailProviderError};
use crate::domain::{EmailSendResult, OutgoingEmail, TransactionalApiConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use validator::Validate;

pub struct TransactionalApiProvider {
    http_client: Client,
    config: TransactionalApiConfig,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    name: &'a str,
    subject: &'a str,
    message: &'a str,
}

impl TransactionalApiProvider {
    pub fn new(config: TransactionalApiConfig) -> Result<Self, EmailProviderError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmailProviderError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl EmailProvider for TransactionalApiProvider {
    async fn send(&self, message: &OutgoingEmail) -> Result<EmailSendResult, EmailProviderError> {
        let template_id = message.provider_template_id.as_deref().ok_or_else(|| {
            EmailProviderError::InvalidConfiguration("Missing provider template id".to_string())
        })?;

        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_deref(),
            template_params: TemplateParams {
                to_email: &message.to_email,
                to_name: &message.to_name,
                name: &message.to_name,
                subject: &message.subject,
                message: &message.html_body,
            },
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    EmailProviderError::ConnectionError(e.to_string())
                } else {
                    EmailProviderError::SendFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(EmailSendResult::success(None));
        }

        let text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(EmailProviderError::AuthenticationFailed(text))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(EmailProviderError::RateLimited),
            _ => Err(EmailProviderError::SendFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            ))),
        }
    }

    /// The API has no credential check endpoint, so only the configuration is
    /// checked here. A bad key surfaces on the first send.
    async fn test_connection(&self) -> Result<(), EmailProviderError> {
        self.config
            .validate()
            .map_err(|e| EmailProviderError::NotConfigured(e.to_string()))
    }
}
