//! Dispatch log repository
//!
//! The table is append-only from the dispatch path. Rows leave it only
//! through an explicit admin delete.

use crate::domain::{CreateDispatchLogInput, DispatchLogEntry};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchLogRepository: Send + Sync {
    /// Append an entry and return its id
    async fn create(&self, input: &CreateDispatchLogInput) -> Result<i64>;
    /// Newest first
    async fn list_recent(&self, offset: i64, limit: i64) -> Result<Vec<DispatchLogEntry>>;
    async fn count(&self) -> Result<i64>;
    async fn find_by_id(&self, id: i64) -> Result<Option<DispatchLogEntry>>;
    async fn delete(&self, id: i64) -> Result<()>;
}

pub struct DispatchLogRepositoryImpl {
    pool: MySqlPool,
}

impl DispatchLogRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, subject, recipients_count, recipients_data, sent_by, \
     status, error_message, provider, template_id, source_sheet_url, sent_at FROM email_logs";

#[async_trait]
impl DispatchLogRepository for DispatchLogRepositoryImpl {
    async fn create(&self, input: &CreateDispatchLogInput) -> Result<i64> {
        let recipients_data = serde_json::to_string(&input.recipients_data)
            .map_err(|e| AppError::Internal(e.into()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO email_logs (subject, recipients_count, recipients_data, sent_by, status, error_message, provider, template_id, source_sheet_url, sent_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&input.subject)
        .bind(input.recipients_count())
        .bind(&recipients_data)
        .bind(&input.sent_by)
        .bind(input.status.as_str())
        .bind(&input.error_message)
        .bind(input.provider.as_str())
        .bind(&input.template_id)
        .bind(&input.source_sheet_url)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    async fn list_recent(&self, offset: i64, limit: i64) -> Result<Vec<DispatchLogEntry>> {
        let sql = format!("{} ORDER BY sent_at DESC, id DESC LIMIT ? OFFSET ?", SELECT_COLUMNS);
        let entries = sqlx::query_as::<_, DispatchLogEntry>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM email_logs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DispatchLogEntry>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let entry = sqlx::query_as::<_, DispatchLogEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM email_logs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Dispatch log {} not found", id)));
        }

        Ok(())
    }
}
