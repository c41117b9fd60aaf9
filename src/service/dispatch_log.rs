//! Dispatch log reads and admin deletes, cached per page

use crate::cache::{keys, TtlCache};
use crate::domain::{CreateDispatchLogInput, DispatchLogEntry};
use crate::error::{AppError, Result};
use crate::repository::DispatchLogRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// One page of log entries plus the overall total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchLogPage {
    pub entries: Vec<DispatchLogEntry>,
    pub total: i64,
}

pub struct DispatchLogService<L: DispatchLogRepository> {
    repo: Arc<L>,
    cache: TtlCache,
    ttl: Duration,
}

impl<L: DispatchLogRepository> DispatchLogService<L> {
    pub fn new(repo: Arc<L>, cache: TtlCache, ttl: Duration) -> Self {
        Self { repo, cache, ttl }
    }

    /// Append an entry and drop every cached page
    pub async fn record(&self, input: &CreateDispatchLogInput) -> Result<i64> {
        let id = self.repo.create(input).await?;
        self.cache.invalidate_pattern(keys::DISPATCH_LOGS).await;
        Ok(id)
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<DispatchLogPage> {
        let key = format!("{}:{}:{}", keys::DISPATCH_LOGS, offset, limit);
        self.cache
            .with_cache(&key, self.ttl, || async {
                let entries = self.repo.list_recent(offset, limit).await?;
                let total = self.repo.count().await?;
                Ok(DispatchLogPage { entries, total })
            })
            .await
    }

    pub async fn get(&self, id: i64) -> Result<DispatchLogEntry> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dispatch log {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        self.cache.invalidate_pattern(keys::DISPATCH_LOGS).await;
        tracing::info!(log_id = id, "Dispatch log deleted");
        Ok(())
    }
}
