//! Report Renderer Port - Turns a sealed result into a downloadable report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::case::Case;
use crate::domain::foundation::ErrorCode;
use crate::domain::session::SealedResult;

/// Renders a feedback report for a scored session.
///
/// Rendering is a pure function of its inputs and never feeds back into the
/// session.
pub trait ReportRenderer: Send + Sync {
    /// Format this renderer produces.
    fn format(&self) -> ReportFormat;

    /// Renders the report bytes.
    fn render(&self, case: &Case, result: &SealedResult) -> Result<Vec<u8>, ExportError>;
}

/// Report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Markdown,
    Html,
}

impl ReportFormat {
    /// MIME content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "text/markdown; charset=utf-8",
            ReportFormat::Html => "text/html; charset=utf-8",
        }
    }

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" | "htm" => Ok(ReportFormat::Html),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// A rendered report ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub content: Vec<u8>,
    pub content_type: String,
    pub filename: String,
    pub format: ReportFormat,
}

impl ExportedReport {
    pub fn new(content: Vec<u8>, format: ReportFormat, base_filename: &str) -> Self {
        Self {
            content,
            content_type: format.content_type().to_string(),
            filename: format!("{}.{}", base_filename, format.extension()),
            format,
        }
    }
}

/// Report rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),

    #[error("Report rendering failed: {0}")]
    RenderFailed(String),
}

impl ExportError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ExportError
    }

    pub fn is_retryable(&self) -> bool {
        false
    }
}
