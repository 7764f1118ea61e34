//! SubmitAnswerHandler - Closes questioning with the learner's answer.

use crate::domain::session::{CaseSession, SessionError, Submission};

/// Command carrying the learner's answer.
#[derive(Debug, Clone, Default)]
pub struct SubmitAnswerCommand {
    pub provisional_diagnosis: String,
    pub investigations: Vec<String>,
    pub management_plan: String,
}

impl SubmitAnswerCommand {
    /// Builds a command from free-text fields; investigations are comma separated.
    pub fn from_text(diagnosis: &str, investigations: &str, plan: &str) -> Self {
        Self {
            provisional_diagnosis: diagnosis.to_string(),
            investigations: Submission::parse_investigations(investigations),
            management_plan: plan.to_string(),
        }
    }
}

/// Handler for submissions. Stateless; exists so every session operation
/// goes through the same logging path.
#[derive(Debug, Default)]
pub struct SubmitAnswerHandler;

impl SubmitAnswerHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        session: &mut CaseSession,
        cmd: SubmitAnswerCommand,
    ) -> Result<(), SessionError> {
        let submission = Submission::new(
            cmd.provisional_diagnosis,
            cmd.investigations,
            cmd.management_plan,
        )?;
        session.submit(submission)?;

        tracing::info!(
            session_id = %session.id(),
            case_id = %session.case_id(),
            questions = session.question_count(),
            "Answer submitted"
        );
        Ok(())
    }
}
