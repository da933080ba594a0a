use serde::{Deserialize, Serialize};

use crate::audit::{AuditReport, AuditStats};
use crate::error::ErrorPayload;
use crate::types::{Issue, Summary};

/// Schema version for output payloads.
pub const AUDIT_OUTPUT_VERSION: &str = "0.1.0";

/// Result of a run: either a report or a single terminal failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditOutput {
    Audit(AuditSuccess),
    RemoteScan(RemoteScanOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSuccess {
    pub version: String,
    pub success: bool,
    pub view_type: String,
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub stats: AuditStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl AuditSuccess {
    pub fn from_report(report: AuditReport, view_type: &str) -> Self {
        Self {
            version: AUDIT_OUTPUT_VERSION.to_string(),
            success: true,
            view_type: view_type.to_string(),
            issues: report.issues,
            summary: report.summary,
            stats: report.stats,
            advisory: report.advisory,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteScanOutput {
    pub version: String,
    pub success: bool,
    pub url: String,
    pub file_count: usize,
    /// Sorted normalized paths.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub success: bool,
    /// Human-readable message, same as `details.message`.
    pub error: String,
    pub details: ErrorPayload,
}

impl ErrorOutput {
    pub fn new(details: ErrorPayload) -> Self {
        Self {
            version: AUDIT_OUTPUT_VERSION.to_string(),
            success: false,
            error: details.message.clone(),
            details,
        }
    }
}
