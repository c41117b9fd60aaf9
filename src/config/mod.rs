//! Configuration management for GameSoc Core

use crate::domain::{SmtpConfig, TransactionalApiConfig};
use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// "development" exposes internal error details in API responses
    pub environment: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// SMTP relay used by the `smtp` provider
    pub smtp: SmtpConfig,
    /// Transactional email API used by the `transactional-api` provider
    pub transactional_api: TransactionalApiConfig,
    /// Spreadsheet import configuration
    pub sheets: SheetsConfig,
    /// Cache TTLs
    pub cache: CacheConfig,
    /// Shared bearer token guarding the admin API. `None` disables the check.
    pub admin_api_token: Option<String>,
    /// Telemetry configuration
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Base URL of the spreadsheet host (overridable for tests)
    pub base_url: String,
    /// Timeout for outbound HTTP calls, in seconds
    pub http_timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.google.com".to_string(),
            http_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached system settings
    pub settings_ttl_secs: u64,
    /// TTL for cached dispatch log listings
    pub logs_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            settings_ttl_secs: 300,
            logs_ttl_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub tracing_enabled: bool,
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            tracing_enabled: false,
            otlp_endpoint: None,
            service_name: "gamesoc-core".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let http_timeout_secs = env::var("HTTP_CLIENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid HTTP_CLIENT_TIMEOUT_SECS")?;

        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .context("Invalid SMTP_PORT")?,
                username: env::var("SMTP_USERNAME").ok().filter(|s| !s.is_empty()),
                password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
                use_tls: env::var("SMTP_USE_TLS")
                    .map(|s| s.to_lowercase() != "false")
                    .unwrap_or(true),
                from_email: env::var("SMTP_FROM_EMAIL")
                    .or_else(|_| env::var("SMTP_USERNAME"))
                    .unwrap_or_else(|_| "noreply@localhost".to_string()),
                from_name: env::var("SMTP_FROM_NAME").ok(),
                timeout_secs: http_timeout_secs,
            },
            transactional_api: TransactionalApiConfig {
                api_url: env::var("EMAILJS_API_URL")
                    .unwrap_or_else(|_| "https://api.emailjs.com/api/v1.0/email/send".to_string()),
                service_id: env::var("EMAILJS_SERVICE_ID").unwrap_or_default(),
                public_key: env::var("EMAILJS_PUBLIC_KEY").unwrap_or_default(),
                private_key: env::var("EMAILJS_PRIVATE_KEY").ok().filter(|s| !s.is_empty()),
                timeout_secs: http_timeout_secs,
            },
            sheets: SheetsConfig {
                base_url: env::var("SHEETS_BASE_URL")
                    .unwrap_or_else(|_| "https://docs.google.com".to_string()),
                http_timeout_secs,
            },
            cache: CacheConfig {
                settings_ttl_secs: env::var("CACHE_SETTINGS_TTL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
                logs_ttl_secs: env::var("CACHE_LOGS_TTL_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            },
            admin_api_token: env::var("ADMIN_API_TOKEN").ok().filter(|s| !s.is_empty()),
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                metrics_enabled: env::var("METRICS_ENABLED")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
                tracing_enabled: env::var("OTEL_TRACING_ENABLED")
                    .map(|s| s.to_lowercase() == "true")
                    .unwrap_or(false),
                otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
                service_name: env::var("OTEL_SERVICE_NAME")
                    .unwrap_or_else(|_| "gamesoc-core".to_string()),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}
