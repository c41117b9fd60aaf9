//! Provider construction, one provider per dispatch batch

use super::{EmailProvider, SmtpEmailProvider, TransactionalApiProvider};
use crate::domain::{ProviderKind, SmtpConfig, TransactionalApiConfig};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use validator::Validate;

/// Factory for building an [`EmailProvider`] of a given kind.
///
/// Services take the factory as a trait object so tests can hand out mock
/// providers without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProviderFactory: Send + Sync {
    async fn create(&self, kind: ProviderKind) -> Result<Box<dyn EmailProvider>>;
}

/// Builds providers from the process configuration
pub struct DefaultEmailProviderFactory {
    smtp: SmtpConfig,
    transactional_api: TransactionalApiConfig,
}

impl DefaultEmailProviderFactory {
    pub fn new(smtp: SmtpConfig, transactional_api: TransactionalApiConfig) -> Self {
        Self {
            smtp,
            transactional_api,
        }
    }
}

#[async_trait]
impl EmailProviderFactory for DefaultEmailProviderFactory {
    async fn create(&self, kind: ProviderKind) -> Result<Box<dyn EmailProvider>> {
        match kind {
            ProviderKind::Smtp => {
                let provider = SmtpEmailProvider::from_config(&self.smtp).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to create SMTP provider: {}", e))
                })?;
                Ok(Box::new(provider))
            }
            ProviderKind::TransactionalApi => {
                self.transactional_api.validate().map_err(|e| {
                    AppError::BadRequest(format!(
                        "Transactional email API is not configured: {}",
                        e
                    ))
                })?;
                let provider = TransactionalApiProvider::new(self.transactional_api.clone())
                    .map_err(|e| {
                        AppError::Internal(anyhow::anyhow!(
                            "Failed to create transactional API provider: {}",
                            e
                        ))
                    })?;
                Ok(Box::new(provider))
            }
        }
    }
}
