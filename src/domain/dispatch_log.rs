//! Dispatch audit log types

use super::{DispatchResult, DispatchStatus, ProviderKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted record of one dispatch. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DispatchLogEntry {
    pub id: i64,
    pub subject: String,
    pub recipients_count: i32,
    #[sqlx(json)]
    pub recipients_data: Vec<DispatchResult>,
    pub sent_by: String,
    #[sqlx(try_from = "String")]
    pub status: DispatchStatus,
    pub error_message: Option<String>,
    #[sqlx(try_from = "String")]
    pub provider: ProviderKind,
    pub template_id: Option<String>,
    pub source_sheet_url: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Input for appending a dispatch log entry
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDispatchLogInput {
    pub subject: String,
    pub recipients_data: Vec<DispatchResult>,
    pub sent_by: String,
    pub status: DispatchStatus,
    pub error_message: Option<String>,
    pub provider: ProviderKind,
    pub template_id: Option<String>,
    pub source_sheet_url: Option<String>,
}

impl CreateDispatchLogInput {
    pub fn recipients_count(&self) -> i32 {
        self.recipients_data.len() as i32
    }
}

/// Number of failures quoted in a log entry's `error_message`
const ERROR_DIGEST_LIMIT: usize = 3;

/// Short digest of the first few failures, `None` when everything was sent.
pub fn failure_digest(results: &[DispatchResult]) -> Option<String> {
    let failures: Vec<_> = results.iter().filter(|r| !r.sent).collect();
    if failures.is_empty() {
        return None;
    }

    let mut digest = failures
        .iter()
        .take(ERROR_DIGEST_LIMIT)
        .map(|r| {
            format!(
                "{}: {}",
                r.email,
                r.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    if failures.len() > ERROR_DIGEST_LIMIT {
        digest.push_str(&format!(
            " (+{} more)",
            failures.len() - ERROR_DIGEST_LIMIT
        ));
    }

    Some(digest)
}
