//! Sealed result of a scored session.

use serde::Serialize;

use super::{EvaluationFeedback, Submission};
use crate::domain::foundation::{CaseId, Score, SessionId, Timestamp};

/// Immutable snapshot of a `Scored` session.
///
/// Only [`CaseSession::sealed_result`](super::CaseSession::sealed_result)
/// builds one, so holding a `SealedResult` proves the session was scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SealedResult {
    session_id: SessionId,
    case_id: CaseId,
    question_count: usize,
    submission: Submission,
    feedback: EvaluationFeedback,
    scored_at: Timestamp,
}

impl SealedResult {
    pub(super) fn new(
        session_id: SessionId,
        case_id: CaseId,
        question_count: usize,
        submission: Submission,
        feedback: EvaluationFeedback,
        scored_at: Timestamp,
    ) -> Self {
        Self {
            session_id,
            case_id,
            question_count,
            submission,
            feedback,
            scored_at,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn feedback(&self) -> &EvaluationFeedback {
        &self.feedback
    }

    pub fn scored_at(&self) -> &Timestamp {
        &self.scored_at
    }

    pub fn score(&self) -> Score {
        self.feedback.score()
    }
}
