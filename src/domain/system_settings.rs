//! System settings domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// System setting row from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SystemSettingRow {
    pub id: i32,
    pub category: String,
    pub setting_key: String,
    #[sqlx(json)]
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// System setting categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingCategory {
    /// Email configuration
    Email,
}

impl SettingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Well-known setting keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Provider used when a dispatch does not name one
    DefaultEmailProvider,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultEmailProvider => "default_provider",
        }
    }

    pub fn category(&self) -> SettingCategory {
        match self {
            Self::DefaultEmailProvider => SettingCategory::Email,
        }
    }

    /// Key used for this setting in the process cache
    pub fn cache_key(&self) -> String {
        format!("settings:{}:{}", self.category(), self.as_str())
    }
}

/// Input for creating/updating a system setting
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSystemSettingInput {
    pub category: String,
    pub setting_key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
}
