use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {document}: {message}")]
    Parse { document: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("WebDAV request failed (status {status}): {message}")]
    RemoteRequest { status: StatusCode, message: String },

    #[error("WebDAV response could not be parsed: {0}")]
    RemoteParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl AuditError {
    pub fn parse(document: impl Into<String>, message: impl Into<String>) -> Self {
        AuditError::Parse {
            document: document.into(),
            message: message.into(),
        }
    }

    pub fn remote_request(status: StatusCode, message: impl Into<String>) -> Self {
        AuditError::RemoteRequest {
            status,
            message: message.into(),
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            AuditError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check output paths/permissions.",
            ),
            AuditError::Parse { .. } => ErrorPayload::new(
                ErrorCategory::Parse,
                self.to_string(),
                "Verify the catalog file exists, is readable, and is a complete XML export.",
            ),
            AuditError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and the WebDAV host name, then retry.",
            ),
            AuditError::RemoteRequest { status, .. } => {
                let remediation = match *status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        "Check the WebDAV username/password (or CATALOG_AUDIT_PASSWORD) and account permissions."
                    }
                    StatusCode::NOT_FOUND => {
                        "Check the WebDAV URL path; it should point at the catalog image library directory."
                    }
                    _ => "Retry later; run with --verbose for details.",
                };
                ErrorPayload::new(ErrorCategory::Remote, self.to_string(), remediation)
            }
            AuditError::RemoteParse(_) => ErrorPayload::new(
                ErrorCategory::Remote,
                self.to_string(),
                "Ensure the URL points at a WebDAV endpoint that answers PROPFIND with a multistatus document.",
            ),
            AuditError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the WebDAV URL (e.g., https://host/on/demandware.servlet/webdav/Sites/Catalogs/master).",
            ),
            AuditError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("password") || lower.contains("username") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Pass --username/--password or set CATALOG_AUDIT_USERNAME/CATALOG_AUDIT_PASSWORD.",
                    )
                } else if lower.contains("webdav url") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Pass --webdav-url or set [webdav] url in the config file.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file.",
                    )
                }
            }
            AuditError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Parse,
    Remote,
    Network,
    Io,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
