//! EvaluateSubmissionHandler - Scores a submitted session.

use std::sync::Arc;

use crate::domain::case::CaseCatalog;
use crate::domain::session::{CaseSession, EvaluationFeedback, SessionError};
use crate::ports::EvaluatorAgent;

/// Handler for evaluation.
///
/// A session is scored at most once. Calls on a session that is not
/// `Submitted` fail before the evaluator is contacted.
pub struct EvaluateSubmissionHandler {
    catalog: Arc<CaseCatalog>,
    evaluator: Arc<dyn EvaluatorAgent>,
}

impl EvaluateSubmissionHandler {
    pub fn new(catalog: Arc<CaseCatalog>, evaluator: Arc<dyn EvaluatorAgent>) -> Self {
        Self { catalog, evaluator }
    }

    pub async fn handle(
        &self,
        session: &mut CaseSession,
    ) -> Result<EvaluationFeedback, SessionError> {
        let submission = session.ensure_can_evaluate()?;
        let case = self.catalog.find(session.case_id())?;

        let feedback = self
            .evaluator
            .evaluate(case, submission)
            .await
            .map_err(|err| {
                tracing::warn!(
                    session_id = %session.id(),
                    case_id = %case.id(),
                    error = %err,
                    "Evaluation failed"
                );
                SessionError::from(err)
            })?;

        let feedback = session.record_feedback(feedback)?.clone();

        tracing::info!(
            session_id = %session.id(),
            case_id = %session.case_id(),
            score = feedback.score().value(),
            red_flags = feedback.red_flags(),
            "Session scored"
        );
        Ok(feedback)
    }
}
