//! Email provider trait and error types

use crate::domain::{EmailSendResult, OutgoingEmail};
use async_trait::async_trait;
use thiserror::Error;

/// Email provider error types
#[derive(Error, Debug)]
pub enum EmailProviderError {
    #[error("Email provider not configured: {0}")]
    NotConfigured(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Rate limited")]
    RateLimited,
}

impl EmailProviderError {
    /// User-actionable advice for failures an admin can fix themselves
    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            Self::AuthenticationFailed(_) => Some(
                "SMTP login was rejected. If the account uses Gmail, create an app password \
                 and use it as SMTP_PASSWORD instead of the account password.",
            ),
            Self::ConnectionError(_) => Some(
                "Could not reach the mail server. Check SMTP_HOST, SMTP_PORT and SMTP_USE_TLS.",
            ),
            Self::NotConfigured(_) | Self::InvalidConfiguration(_) => {
                Some("The email provider is not fully configured. Check the server environment.")
            }
            Self::RateLimited => Some("The email provider is rate limiting us. Try again later."),
            Self::SendFailed(_) | Self::InvalidRecipient(_) => None,
        }
    }
}

/// One transport a dispatch can go through. Selected once per batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send one personalized message to its single recipient
    async fn send(&self, message: &OutgoingEmail) -> Result<EmailSendResult, EmailProviderError>;

    /// Check connectivity and credentials without sending anything
    async fn test_connection(&self) -> Result<(), EmailProviderError>;
}
