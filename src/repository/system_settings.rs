//! System settings repository

use crate::domain::{SystemSettingRow, UpsertSystemSettingInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SystemSettingsRepository: Send + Sync {
    /// Get a setting by category and key
    async fn get(&self, category: &str, key: &str) -> Result<Option<SystemSettingRow>>;

    /// Upsert a setting (insert or update)
    async fn upsert(&self, input: &UpsertSystemSettingInput) -> Result<SystemSettingRow>;

    /// Delete a setting. Deleting a missing setting is not an error.
    async fn delete(&self, category: &str, key: &str) -> Result<()>;
}

pub struct SystemSettingsRepositoryImpl {
    pool: MySqlPool,
}

impl SystemSettingsRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SystemSettingsRepository for SystemSettingsRepositoryImpl {
    async fn get(&self, category: &str, key: &str) -> Result<Option<SystemSettingRow>> {
        let row = sqlx::query_as::<_, SystemSettingRow>(
            r#"
            SELECT id, category, setting_key, value, description, created_at, updated_at
            FROM system_settings
            WHERE category = ? AND setting_key = ?
            "#,
        )
        .bind(category)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert(&self, input: &UpsertSystemSettingInput) -> Result<SystemSettingRow> {
        let value_json =
            serde_json::to_string(&input.value).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO system_settings (category, setting_key, value, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, NOW(), NOW())
            ON DUPLICATE KEY UPDATE
                value = VALUES(value),
                description = VALUES(description),
                updated_at = NOW()
            "#,
        )
        .bind(&input.category)
        .bind(&input.setting_key)
        .bind(&value_json)
        .bind(&input.description)
        .execute(&self.pool)
        .await?;

        self.get(&input.category, &input.setting_key)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to upsert setting")))
    }

    async fn delete(&self, category: &str, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM system_settings WHERE category = ? AND setting_key = ?")
            .bind(category)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
