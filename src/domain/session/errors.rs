//! Session-specific error types.

use thiserror::Error;

use super::SessionState;
use crate::domain::case::CatalogError;
use crate::domain::foundation::{CaseId, ErrorCode, SessionId, ValidationError};
use crate::ports::AgentError;

/// Errors raised by case session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation invoked outside its valid state.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The session's result is already in history.
    #[error("session {0} is already recorded")]
    AlreadyRecorded(SessionId),

    /// Requested case is not in the catalog.
    #[error("case not found: {0}")]
    CaseNotFound(CaseId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Patient or evaluator generation failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Patient or evaluator generation exceeded its time budget.
    #[error("generation timed out after {timeout_secs}s")]
    GenerationTimeout { timeout_secs: u64 },

    /// Evaluator output could not be mapped to feedback.
    #[error("evaluation output could not be parsed: {0}")]
    EvaluationParse(String),

    /// History append or read failed.
    #[error("history storage error: {0}")]
    Storage(String),

    /// Report rendering failed.
    #[error("report export failed: {0}")]
    Export(String),

    #[error("internal error: {0}")]
    Infrastructure(String),
}

impl SessionError {
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        SessionError::InvalidState { operation, state }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::InvalidState { .. } | SessionError::AlreadyRecorded(_) => {
                ErrorCode::InvalidState
            }
            SessionError::CaseNotFound(_) => ErrorCode::CaseNotFound,
            SessionError::Validation(_) => ErrorCode::ValidationFailed,
            SessionError::Generation(_) => ErrorCode::GenerationFailed,
            SessionError::GenerationTimeout { .. } => ErrorCode::GenerationTimeout,
            SessionError::EvaluationParse(_) => ErrorCode::EvaluationParseFailed,
            SessionError::Storage(_) => ErrorCode::StorageError,
            SessionError::Export(_) => ErrorCode::ExportError,
            SessionError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if repeating the same call may succeed.
    ///
    /// Usage errors and missing cases are never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::Generation(_)
                | SessionError::GenerationTimeout { .. }
                | SessionError::EvaluationParse(_)
                | SessionError::Storage(_)
        )
    }
}

impl From<AgentError> for SessionError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Generation(message) => SessionError::Generation(message),
            AgentError::Timeout { timeout_secs } => SessionError::GenerationTimeout { timeout_secs },
            AgentError::Parse(message) => SessionError::EvaluationParse(message),
        }
    }
}

impl From<CatalogError> for SessionError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => SessionError::CaseNotFound(id),
            other => SessionError::Infrastructure(other.to_string()),
        }
    }
}
