//! Bulk email dispatch domain types

use super::ProviderKind;
use serde::{Deserialize, Serialize};

/// A person to email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Only the `@` check is applied; the provider is the real judge.
    pub fn has_valid_email(&self) -> bool {
        self.email.contains('@')
    }
}

/// Outcome for a single recipient. One per recipient, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub name: String,
    pub email: String,
    pub sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn sent(recipient: &Recipient) -> Self {
        Self {
            name: recipient.name.clone(),
            email: recipient.email.clone(),
            sent: true,
            error: None,
        }
    }

    pub fn failed(recipient: &Recipient, error: impl Into<String>) -> Self {
        Self {
            name: recipient.name.clone(),
            email: recipient.email.clone(),
            sent: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Success,
    Partial,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DispatchStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "success" => Ok(Self::Success),
            "partial" => Ok(Self::Partial),
            "failed" => Ok(Self::Failed),
            other => Err(format!("Unknown dispatch status: {}", other)),
        }
    }
}

/// Aggregate over a result list. Always derived, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub total: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub status: DispatchStatus,
}

impl DispatchSummary {
    pub fn from_results(results: &[DispatchResult]) -> Self {
        let total = results.len();
        let sent_count = results.iter().filter(|r| r.sent).count();
        let failed_count = total - sent_count;

        let status = if sent_count == 0 {
            DispatchStatus::Failed
        } else if failed_count == 0 {
            DispatchStatus::Success
        } else {
            DispatchStatus::Partial
        };

        Self {
            total,
            sent_count,
            failed_count,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchAction {
    /// Send through a provider, then log
    #[default]
    Send,
    /// The caller already sent; aggregate and log only
    LogOnly,
}

/// Validated dispatch input handed to the dispatch service
#[derive(Debug, Clone, Default)]
pub struct DispatchCommand {
    pub recipients: Vec<Recipient>,
    pub subject: String,
    pub html_body: String,
    /// Explicit provider; falls back to the stored default when `None`
    pub provider: Option<ProviderKind>,
    pub provider_template_id: Option<String>,
    /// Site-side template the body was built from, kept for the log
    pub template_id: Option<String>,
    pub source_sheet_url: Option<String>,
    pub sent_by: String,
    pub action: DispatchAction,
    pub precomputed_results: Vec<DispatchResult>,
    pub skip_log: bool,
}

/// What a dispatch returns to the caller
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub provider: ProviderKind,
    pub summary: DispatchSummary,
    pub results: Vec<DispatchResult>,
    /// Id of the persisted log entry, when one was written
    pub log_id: Option<i64>,
}
