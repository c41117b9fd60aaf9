//! Bulk email dispatch
//!
//! One batch goes through exactly one provider. Recipients are sent to one at
//! a time; a failed recipient is recorded and the loop moves on. Only a
//! failed SMTP connection check aborts the batch, before anything is sent.

use crate::domain::{
    failure_digest, CreateDispatchLogInput, DispatchAction, DispatchCommand, DispatchOutcome,
    DispatchResult, DispatchSummary, OutgoingEmail, ProviderKind, Recipient,
};
use crate::email::{html_to_text, personalize, EmailProvider, EmailProviderError, EmailProviderFactory};
use crate::error::{AppError, Result};
use crate::repository::{DispatchLogRepository, SystemSettingsRepository};
use crate::service::{DispatchLogService, SystemSettingsService};
use crate::telemetry::metrics::{record_dispatch, record_email_send};
use std::sync::Arc;
use std::time::Instant;

const INVALID_EMAIL_ERROR: &str = "Invalid email address";

pub struct DispatchService<S: SystemSettingsRepository, L: DispatchLogRepository> {
    provider_factory: Arc<dyn EmailProviderFactory>,
    settings_service: Arc<SystemSettingsService<S>>,
    log_service: Arc<DispatchLogService<L>>,
}

impl<S: SystemSettingsRepository, L: DispatchLogRepository> DispatchService<S, L> {
    pub fn new(
        provider_factory: Arc<dyn EmailProviderFactory>,
        settings_service: Arc<SystemSettingsService<S>>,
        log_service: Arc<DispatchLogService<L>>,
    ) -> Self {
        Self {
            provider_factory,
            settings_service,
            log_service,
        }
    }

    pub async fn dispatch(&self, command: DispatchCommand) -> Result<DispatchOutcome> {
        match command.action {
            DispatchAction::Send => self.send_batch(command).await,
            DispatchAction::LogOnly => self.log_precomputed(command).await,
        }
    }

    /// Connect and authenticate against a provider without sending anything
    pub async fn verify_provider(&self, requested: Option<ProviderKind>) -> Result<ProviderKind> {
        let kind = self.resolve_provider(requested).await?;
        let provider = self.provider_factory.create(kind).await?;
        provider
            .test_connection()
            .await
            .map_err(connection_error)?;
        Ok(kind)
    }

    async fn send_batch(&self, command: DispatchCommand) -> Result<DispatchOutcome> {
        if command.recipients.is_empty() {
            return Err(AppError::Validation("No recipients provided".to_string()));
        }

        let kind = self.resolve_provider(command.provider).await?;
        validate_for_provider(kind, &command)?;

        let provider = self.provider_factory.create(kind).await?;
        if kind == ProviderKind::Smtp {
            provider
                .test_connection()
                .await
                .map_err(connection_error)?;
        }

        tracing::info!(
            provider = %kind,
            recipients = command.recipients.len(),
            sent_by = %command.sent_by,
            "Starting email dispatch"
        );

        let started = Instant::now();
        let mut results = Vec::with_capacity(command.recipients.len());
        for recipient in &command.recipients {
            let result = send_one(provider.as_ref(), kind, &command, recipient).await;
            record_email_send(kind.as_str(), result.sent);
            results.push(result);
        }

        let summary = DispatchSummary::from_results(&results);
        record_dispatch(
            kind.as_str(),
            summary.status.as_str(),
            started.elapsed().as_secs_f64(),
        );
        tracing::info!(
            provider = %kind,
            total = summary.total,
            sent = summary.sent_count,
            failed = summary.failed_count,
            status = %summary.status,
            "Email dispatch finished"
        );

        let log_id = self.write_log(kind, &command, &results, &summary).await;
        Ok(DispatchOutcome {
            provider: kind,
            summary,
            results,
            log_id,
        })
    }

    /// The caller already sent the mail and only wants it aggregated and logged
    async fn log_precomputed(&self, command: DispatchCommand) -> Result<DispatchOutcome> {
        if command.precomputed_results.is_empty() {
            return Err(AppError::Validation(
                "precomputedResults must not be empty for log_only".to_string(),
            ));
        }

        let kind = self.resolve_provider(command.provider).await?;
        let results = command.precomputed_results.clone();
        let summary = DispatchSummary::from_results(&results);
        record_dispatch(kind.as_str(), summary.status.as_str(), 0.0);

        let log_id = self.write_log(kind, &command, &results, &summary).await;
        Ok(DispatchOutcome {
            provider: kind,
            summary,
            results,
            log_id,
        })
    }

    async fn resolve_provider(&self, requested: Option<ProviderKind>) -> Result<ProviderKind> {
        match requested {
            Some(kind) => Ok(kind),
            None => self.settings_service.get_default_provider().await,
        }
    }

    /// Persist the batch. A failure here never fails the dispatch.
    async fn write_log(
        &self,
        kind: ProviderKind,
        command: &DispatchCommand,
        results: &[DispatchResult],
        summary: &DispatchSummary,
    ) -> Option<i64> {
        if command.skip_log {
            return None;
        }

        let input = CreateDispatchLogInput {
            subject: command.subject.clone(),
            recipients_data: results.to_vec(),
            sent_by: command.sent_by.clone(),
            status: summary.status,
            error_message: failure_digest(results),
            provider: kind,
            template_id: command.template_id.clone(),
            source_sheet_url: command.source_sheet_url.clone(),
        };

        match self.log_service.record(&input).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(
                    provider = %kind,
                    recipients = results.len(),
                    "Failed to write dispatch log: {}",
                    e
                );
                None
            }
        }
    }
}

fn validate_for_provider(kind: ProviderKind, command: &DispatchCommand) -> Result<()> {
    match kind {
        ProviderKind::TransactionalApi => {
            let has_template = command
                .provider_template_id
                .as_deref()
                .is_some_and(|id| !id.trim().is_empty());
            if !has_template {
                return Err(AppError::Validation(
                    "providerTemplateId is required for the transactional-api provider"
                        .to_string(),
                ));
            }
        }
        ProviderKind::Smtp => {
            if command.subject.trim().is_empty() {
                return Err(AppError::Validation(
                    "subject is required for the smtp provider".to_string(),
                ));
            }
            if command.html_body.trim().is_empty() {
                return Err(AppError::Validation(
                    "htmlContent is required for the smtp provider".to_string(),
                ));
            }
        }
    }
    Ok(())
}

async fn send_one(
    provider: &dyn EmailProvider,
    kind: ProviderKind,
    command: &DispatchCommand,
    recipient: &Recipient,
) -> DispatchResult {
    if !recipient.has_valid_email() {
        return DispatchResult::failed(recipient, INVALID_EMAIL_ERROR);
    }

    let html_body = personalize(&command.html_body, recipient);
    let message = OutgoingEmail {
        to_email: recipient.email.clone(),
        to_name: recipient.name.clone(),
        subject: personalize(&command.subject, recipient),
        text_body: (kind == ProviderKind::Smtp).then(|| html_to_text(&html_body)),
        html_body,
        provider_template_id: command.provider_template_id.clone(),
    };

    match provider.send(&message).await {
        Ok(result) if result.success => DispatchResult::sent(recipient),
        Ok(result) => DispatchResult::failed(
            recipient,
            result.error.unwrap_or_else(|| "Unknown error".to_string()),
        ),
        Err(e) => {
            tracing::warn!(provider = %kind, email = %recipient.email, "Email send failed: {}", e);
            DispatchResult::failed(recipient, e.to_string())
        }
    }
}

fn connection_error(e: EmailProviderError) -> AppError {
    let hint = e
        .remediation_hint()
        .unwrap_or("Could not verify the email provider")
        .to_string();
    AppError::EmailConnection {
        message: e.to_string(),
        hint,
    }
}
