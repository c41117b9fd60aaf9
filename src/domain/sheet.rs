//! Spreadsheet import result

use super::Recipient;
use serde::{Deserialize, Serialize};

/// Recipients extracted from a spreadsheet export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetImport {
    pub recipients: Vec<Recipient>,
    /// Header row as found in the sheet
    pub headers: Vec<String>,
    /// Data rows dropped for a blank name or an email without `@`
    pub skipped_rows: usize,
}
