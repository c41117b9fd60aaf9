//! Outbound email
//!
//! Two interchangeable transports sit behind [`EmailProvider`]:
//! - SMTP relay (lettre)
//! - Transactional email HTTP API (reqwest)

pub mod factory;
pub mod provider;
pub mod smtp;
pub mod templates;
pub mod transactional;

pub use factory::{DefaultEmailProviderFactory, EmailProviderFactory};
pub use provider::{EmailProvider, EmailProviderError};
pub use smtp::SmtpEmailProvider;
pub use templates::{html_to_text, personalize, TemplateEngine};
pub use transactional::TransactionalApiProvider;
