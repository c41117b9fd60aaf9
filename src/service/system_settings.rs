//! System settings service

use crate::cache::TtlCache;
use crate::domain::{ProviderKind, SettingKey, UpsertSystemSettingInput};
use crate::error::{AppError, Result};
use crate::repository::SystemSettingsRepository;
use std::sync::Arc;
use std::time::Duration;

/// Service for managing system-wide settings
pub struct SystemSettingsService<R: SystemSettingsRepository> {
    repo: Arc<R>,
    cache: TtlCache,
    ttl: Duration,
}

impl<R: SystemSettingsRepository> SystemSettingsService<R> {
    pub fn new(repo: Arc<R>, cache: TtlCache, ttl: Duration) -> Self {
        Self { repo, cache, ttl }
    }

    /// Provider used when a dispatch names none. Falls back to SMTP when unset.
    pub async fn get_default_provider(&self) -> Result<ProviderKind> {
        let key = SettingKey::DefaultEmailProvider;
        self.cache
            .with_cache(&key.cache_key(), self.ttl, || async {
                let row = self.repo.get(key.category().as_str(), key.as_str()).await?;

                Ok(match row {
                    Some(row) => serde_json::from_value(row.value.clone()).unwrap_or_else(|e| {
                        tracing::warn!(
                            value = %row.value,
                            "Ignoring unreadable default provider setting: {}",
                            e
                        );
                        ProviderKind::default()
                    }),
                    None => ProviderKind::default(),
                })
            })
            .await
    }

    /// Store the default provider and drop the cached copy
    pub async fn set_default_provider(&self, provider: ProviderKind) -> Result<ProviderKind> {
        let key = SettingKey::DefaultEmailProvider;
        let input = UpsertSystemSettingInput {
            category: key.category().as_str().to_string(),
            setting_key: key.as_str().to_string(),
            value: serde_json::to_value(provider).map_err(|e| AppError::Internal(e.into()))?,
            description: Some("Email provider used when a dispatch names none".to_string()),
        };

        self.repo.upsert(&input).await?;
        self.cache.invalidate(&key.cache_key()).await;

        tracing::info!(provider = %provider, "Default email provider updated");
        Ok(provider)
    }

    /// Forget the stored default so the built-in one applies again
    pub async fn reset_default_provider(&self) -> Result<ProviderKind> {
        let key = SettingKey::DefaultEmailProvider;
        self.repo
            .delete(key.category().as_str(), key.as_str())
            .await?;
        self.cache.invalidate(&key.cache_key()).await;

        Ok(ProviderKind::default())
    }
}
