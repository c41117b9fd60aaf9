//! Recipient import from a Google Sheets share link
//!
//! The sheet must be shared as "anyone with the link". Its CSV export is
//! fetched, the name and email columns are located by substring match on the
//! header row, and every row with a name and an `@` address becomes a
//! recipient.

use crate::config::SheetsConfig;
use crate::domain::{Recipient, SheetImport};
use crate::error::{AppError, Result};
use crate::telemetry::metrics::record_sheet_import;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const SHEETS_HOST: &str = "docs.google.com";
const NAME_HEADER_KEYWORDS: &[&str] = &["name", "participant", "leader"];
const EMAIL_HEADER_KEYWORDS: &[&str] = &["email", "mail"];

pub struct SheetImportService {
    http_client: Client,
    base_url: String,
}

impl SheetImportService {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// CSV export URL for a share link
    pub fn export_url(&self, share_url: &str) -> Result<String> {
        let (sheet_id, gid) = parse_share_url(share_url)?;

        let mut export = format!(
            "{}/spreadsheets/d/{}/export?format=csv",
            self.base_url, sheet_id
        );
        if let Some(gid) = gid {
            export.push_str("&gid=");
            export.push_str(&gid);
        }
        Ok(export)
    }

    pub async fn import(&self, share_url: &str) -> Result<SheetImport> {
        let export_url = self.export_url(share_url)?;

        let csv = match self.fetch_csv(&export_url).await {
            Ok(csv) => csv,
            Err(e) => {
                record_sheet_import("upstream_error");
                return Err(e);
            }
        };

        match parse_recipients(&csv) {
            Ok(import) => {
                record_sheet_import("ok");
                tracing::info!(
                    recipients = import.recipients.len(),
                    skipped_rows = import.skipped_rows,
                    "Imported recipients from sheet"
                );
                Ok(import)
            }
            Err(e) => {
                record_sheet_import("columns_not_found");
                Err(e)
            }
        }
    }

    async fn fetch_csv(&self, export_url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(export_url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Could not reach Google Sheets: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Google Sheets returned HTTP {}. Check the link and share the sheet as \
                 \"Anyone with the link\".",
                status.as_u16()
            )));
        }

        // A private sheet answers with a sign-in page instead of CSV
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(AppError::Upstream(
                "The sheet is not shared publicly. Share it as \"Anyone with the link\"."
                    .to_string(),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read sheet export: {}", e)))
    }
}

/// Extract the spreadsheet id and optional tab id from a share link
fn parse_share_url(share_url: &str) -> Result<(String, Option<String>)> {
    let invalid = || {
        AppError::Validation(
            "Not a Google Sheets link. Expected https://docs.google.com/spreadsheets/d/<id>/..."
                .to_string(),
        )
    };

    let url = Url::parse(share_url.trim()).map_err(|_| invalid())?;
    if url.host_str() != Some(SHEETS_HOST) {
        return Err(invalid());
    }

    let mut segments = url.path_segments().ok_or_else(invalid)?;
    let sheet_id = match (segments.next(), segments.next(), segments.next()) {
        (Some("spreadsheets"), Some("d"), Some(id))
            if !id.is_empty()
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            id.to_string()
        }
        _ => return Err(invalid()),
    };

    let gid = url
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            url.fragment()
                .and_then(|f| f.split('&').find_map(|p| p.strip_prefix("gid=")))
                .map(String::from)
        })
        .filter(|gid| !gid.is_empty() && gid.chars().all(|c| c.is_ascii_digit()));

    Ok((sheet_id, gid))
}

/// Parse a CSV export into recipients
pub fn parse_recipients(csv: &str) -> Result<SheetImport> {
    let csv = csv.strip_prefix('\u{feff}').unwrap_or(csv);
    let mut rows = parse_csv(csv)
        .into_iter()
        .filter(|row| row.iter().any(|field| !field.trim().is_empty()));

    let headers: Vec<String> = match rows.next() {
        Some(row) => row.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(AppError::ColumnsNotFound { headers: vec![] }),
    };

    let name_col = find_column(&headers, NAME_HEADER_KEYWORDS);
    let email_col = find_column(&headers, EMAIL_HEADER_KEYWORDS);
    let (name_col, email_col) = match (name_col, email_col) {
        (Some(n), Some(e)) => (n, e),
        _ => return Err(AppError::ColumnsNotFound { headers }),
    };

    let mut recipients = Vec::new();
    let mut skipped_rows = 0;
    for row in rows {
        let name = row.get(name_col).map(|s| s.trim()).unwrap_or_default();
        let email = row.get(email_col).map(|s| s.trim()).unwrap_or_default();

        let recipient = Recipient::new(name, email);
        if name.is_empty() || !recipient.has_valid_email() {
            skipped_rows += 1;
            continue;
        }
        recipients.push(recipient);
    }

    Ok(SheetImport {
        recipients,
        headers,
        skipped_rows,
    })
}

/// First header containing any keyword, case-insensitively
fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.to_lowercase();
        keywords.iter().any(|k| header.contains(k))
    })
}

/// RFC 4180 style reader: quoted fields may hold commas, doubled quotes and
/// line breaks. Accepts LF and CRLF line endings.
fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
