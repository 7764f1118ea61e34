//! AskPatientHandler - One question/answer exchange with the patient.

use std::sync::Arc;

use crate::domain::case::CaseCatalog;
use crate::domain::session::{CaseSession, ConversationTurn, SessionError};
use crate::ports::PatientAgent;

/// Command to ask the patient a question.
#[derive(Debug, Clone)]
pub struct AskPatientCommand {
    pub question: String,
}

/// Handler for patient questions.
pub struct AskPatientHandler {
    catalog: Arc<CaseCatalog>,
    patient: Arc<dyn PatientAgent>,
}

impl AskPatientHandler {
    pub fn new(catalog: Arc<CaseCatalog>, patient: Arc<dyn PatientAgent>) -> Self {
        Self { catalog, patient }
    }

    /// Returns the patient's turn.
    ///
    /// The reply is generated before anything is recorded, so on failure the
    /// session's turns are exactly as before.
    pub async fn handle(
        &self,
        session: &mut CaseSession,
        cmd: AskPatientCommand,
    ) -> Result<ConversationTurn, SessionError> {
        // 1. Validate state and input
        session.ensure_can_ask()?;
        let question = ConversationTurn::learner(cmd.question)?;
        let case = self.catalog.find(session.case_id())?;

        // 2. Generate the reply
        let reply = self
            .patient
            .reply(case, session.turns(), question.text())
            .await
            .map_err(|err| {
                tracing::warn!(
                    session_id = %session.id(),
                    case_id = %case.id(),
                    error = %err,
                    "Patient reply failed"
                );
                SessionError::from(err)
            })?;
        let reply = ConversationTurn::patient(reply)?;

        // 3. Record both turns together
        let turn = session.record_exchange(question, reply)?.clone();

        tracing::info!(
            session_id = %session.id(),
            case_id = %session.case_id(),
            turns = session.turns().len(),
            "Patient answered"
        );
        Ok(turn)
    }
}
