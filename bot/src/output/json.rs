//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::StatusReport;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    #[serde(flatten)]
    report: &'a StatusReport,
    explanation: String,
}

/// Format a status report with its rendered explanation.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_status(report: &StatusReport) -> Result<String> {
    let doc = StatusDocument {
        report,
        explanation: report.explanation(),
    };
    serde_json::to_string_pretty(&doc).context("JSON serialization failed")
}

/// The status document, or an error object when the status could not be
/// determined.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &StatusReport) -> Result<String> {
    match &report.error {
        Some(message) => format_error(message, "STATUS_UNAVAILABLE"),
        None => format_status(report),
    }
}
