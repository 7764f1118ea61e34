//! Agent Ports - The patient and evaluator capabilities.
//!
//! The session engine depends only on these traits. Production adapters wrap
//! an [`AIProvider`](super::AIProvider); tests substitute deterministic stubs.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;
use crate::domain::case::Case;
use crate::domain::foundation::ErrorCode;
use crate::domain::session::{ConversationTurn, EvaluationFeedback, Submission};

/// Answers learner questions in character as the case's patient.
#[async_trait]
pub trait PatientAgent: Send + Sync {
    /// Generates the patient's reply to `question`.
    ///
    /// `history` holds the turns so far, not including `question`. The reply
    /// must be non-empty.
    async fn reply(
        &self,
        case: &Case,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, AgentError>;
}

/// Scores a submission against a case rubric.
#[async_trait]
pub trait EvaluatorAgent: Send + Sync {
    /// Produces feedback covering every rubric criterion.
    async fn evaluate(
        &self,
        case: &Case,
        submission: &Submission,
    ) -> Result<EvaluationFeedback, AgentError>;
}

/// Failures of a patient or evaluator call. All are retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// Underlying generation capability failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Generation exceeded its time budget.
    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Output could not be mapped to the expected shape.
    #[error("could not parse agent output: {0}")]
    Parse(String),
}

impl AgentError {
    pub fn generation(message: impl Into<String>) -> Self {
        AgentError::Generation(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        AgentError::Parse(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AgentError::Generation(_) => ErrorCode::GenerationFailed,
            AgentError::Timeout { .. } => ErrorCode::GenerationTimeout,
            AgentError::Parse(_) => ErrorCode::EvaluationParseFailed,
        }
    }

    /// Every agent failure leaves the session untouched, so all may be retried.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

impl From<AIError> for AgentError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::Timeout { timeout_secs } => AgentError::Timeout { timeout_secs },
            other => AgentError::Generation(other.to_string()),
        }
    }
}
