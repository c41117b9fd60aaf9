//! SMTP email provider implementation using lettre

use super::provider::{EmailProvider, EmailProviderError};
use crate::domain::{EmailSendResult, OutgoingEmail, SmtpConfig};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

/// SMTP-based email provider
pub struct SmtpEmailProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: Option<String>,
}

impl SmtpEmailProvider {
    /// Create a new SMTP provider from configuration
    pub fn from_config(config: &SmtpConfig) -> Result<Self, EmailProviderError> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| EmailProviderError::InvalidConfiguration(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn build_from_mailbox(&self) -> Result<Mailbox, EmailProviderError> {
        let address: Address = self.from_email.parse().map_err(|e| {
            EmailProviderError::InvalidConfiguration(format!("Invalid from address: {}", e))
        })?;
        Ok(Mailbox::new(self.from_name.clone(), address))
    }

    fn build_to_mailbox(message: &OutgoingEmail) -> Result<Mailbox, EmailProviderError> {
        let address: Address = message.to_email.parse().map_err(|e| {
            EmailProviderError::InvalidRecipient(format!("{}: {}", message.to_email, e))
        })?;
        let name = Some(message.to_name.trim())
            .filter(|name| !name.is_empty())
            .map(String::from);
        Ok(Mailbox::new(name, address))
    }

    fn build_message(&self, message: &OutgoingEmail) -> Result<Message, EmailProviderError> {
        let to = Self::build_to_mailbox(message)?;

        let builder = Message::builder()
            .from(self.build_from_mailbox()?)
            .to(to)
            .subject(&message.subject);

        // multipart when a plain-text alternative is available
        let email = if let Some(text_body) = &message.text_body {
            builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(message.html_body.clone()),
                    ),
            )
        } else {
            builder
                .header(ContentType::TEXT_HTML)
                .body(message.html_body.clone())
        };

        email.map_err(|e| EmailProviderError::SendFailed(e.to_string()))
    }
}

/// Map an SMTP error text onto the provider error taxonomy
fn classify_smtp_error(error_msg: String) -> EmailProviderError {
    let lower = error_msg.to_lowercase();
    if lower.contains("authentication")
        || error_msg.contains("AUTH")
        || error_msg.contains("535")
        || lower.contains("username and password not accepted")
    {
        EmailProviderError::AuthenticationFailed(error_msg)
    } else if lower.contains("connection") || lower.contains("timed out") || lower.contains("timeout")
    {
        EmailProviderError::ConnectionError(error_msg)
    } else {
        EmailProviderError::SendFailed(error_msg)
    }
}

#[async_trait]
impl EmailProvider for SmtpEmailProvider {
    async fn send(&self, message: &OutgoingEmail) -> Result<EmailSendResult, EmailProviderError> {
        let email = self.build_message(message)?;

        match self.transport.send(email).await {
            Ok(response) => {
                let message_id = response.message().next().map(|s| s.to_string());
                Ok(EmailSendResult::success(message_id))
            }
            Err(e) => Err(classify_smtp_error(e.to_string())),
        }
    }

    async fn test_connection(&self) -> Result<(), EmailProviderError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EmailProviderError::ConnectionError(
                "SMTP server did not accept the connection".to_string(),
            )),
            Err(e) => Err(match classify_smtp_error(e.to_string()) {
                EmailProviderError::SendFailed(msg) => EmailProviderError::ConnectionError(msg),
                other => other,
            }),
        }
    }
}
