//! Error types shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::ValidationFailed
    }

    /// The same input fails the same way.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Stable error codes, shared by every error type in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    CaseNotFound,

    // State errors
    InvalidState,

    // Agent errors
    GenerationFailed,
    GenerationTimeout,
    EvaluationParseFailed,

    // Infrastructure errors
    CatalogError,
    StorageError,
    ExportError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::CaseNotFound => "CASE_NOT_FOUND",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
            ErrorCode::GenerationTimeout => "GENERATION_TIMEOUT",
            ErrorCode::EvaluationParseFailed => "EVALUATION_PARSE_FAILED",
            ErrorCode::CatalogError => "CATALOG_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::ExportError => "EXPORT_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
