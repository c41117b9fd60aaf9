//! Email provider domain types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Which transport a dispatch goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProviderKind {
    /// SMTP relay (Gmail with an app password in practice)
    #[default]
    #[serde(rename = "smtp")]
    Smtp,

    /// Third-party transactional email HTTP API (EmailJS)
    #[serde(rename = "transactional-api", alias = "emailjs", alias = "transactional_api")]
    TransactionalApi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::TransactionalApi => "transactional-api",
        }
    }

    /// Whether a connection check can prove the credentials before sending
    pub fn verifies_credentials(&self) -> bool {
        matches!(self, Self::Smtp)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "transactional-api" | "transactional_api" | "emailjs" => Ok(Self::TransactionalApi),
            _ => Err(format!("Unknown email provider: {}", s)),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// SMTP configuration for email sending
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct SmtpConfig {
    /// SMTP server host
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    /// SMTP server port (typically 587 for STARTTLS, 465 for SSL, 25 for unencrypted)
    pub port: u16,

    pub username: Option<String>,

    /// Never serialized back to API clients
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Use STARTTLS
    #[serde(default = "default_true")]
    pub use_tls: bool,

    #[validate(email)]
    pub from_email: String,

    pub from_name: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Transactional email API configuration (EmailJS REST endpoint)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct TransactionalApiConfig {
    #[validate(url)]
    pub api_url: String,

    #[validate(length(min = 1))]
    pub service_id: String,

    /// Public key, sent as `user_id`
    #[validate(length(min = 1))]
    pub public_key: String,

    /// Private key, sent as `accessToken` when present
    #[serde(skip_serializing)]
    pub private_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

/// A fully personalized message addressed to a single recipient
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    /// Provider-side template (transactional API only)
    pub provider_template_id: Option<String>,
}

/// Result of sending an email
#[derive(Debug)]
pub struct EmailSendResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl EmailSendResult {
    pub fn success(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}
