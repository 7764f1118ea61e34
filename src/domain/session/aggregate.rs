//! Case session aggregate.
//!
//! One learner's attempt at one case. All mutation goes through the
//! transition methods below; `submission` and `feedback` have no setters.
//!
//! The aggregate does not call agents or persist anything. Handlers generate
//! replies and feedback first and only then record them here, so a failed
//! generation leaves the session untouched.

use serde::Serialize;

use super::{
    ConversationTurn, EvaluationFeedback, SealedResult, SessionError, SessionState, Speaker,
    Submission,
};
use crate::domain::foundation::{CaseId, SessionId, StateMachine, Timestamp, ValidationError};

/// A single attempt at a case.
///
/// # Invariants
///
/// - `submission` is set iff `state` is `Submitted` or `Scored`
/// - `feedback` is set iff `state` is `Scored`
/// - Turns alternate learner/patient and are only appended while `Questioning`
/// - A `Scored` session never changes again, apart from being marked recorded
/// - `recorded` is only set on a `Scored` session, once
///
/// Sessions are built by [`CaseSession::start`] only; there is no
/// deserializing one back from storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSession {
    id: SessionId,
    case_id: CaseId,
    state: SessionState,
    turns: Vec<ConversationTurn>,
    submission: Option<Submission>,
    feedback: Option<EvaluationFeedback>,
    started_at: Timestamp,
    scored_at: Option<Timestamp>,
    recorded: bool,
}

impl CaseSession {
    /// Starts a fresh session in `Questioning`.
    pub fn start(case_id: CaseId) -> Self {
        Self {
            id: SessionId::new(),
            case_id,
            state: SessionState::Questioning,
            turns: Vec::new(),
            submission: None,
            feedback: None,
            started_at: Timestamp::now(),
            scored_at: None,
            recorded: false,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn feedback(&self) -> Option<&EvaluationFeedback> {
        self.feedback.as_ref()
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn scored_at(&self) -> Option<&Timestamp> {
        self.scored_at.as_ref()
    }

    /// True once the sealed result has been written to history.
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    /// Number of questions the learner has asked.
    pub fn question_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker() == Speaker::Learner)
            .count()
    }

    // ───────────────────────────────────────────────────────────────
    // Transitions
    // ───────────────────────────────────────────────────────────────

    /// Checks that a question may be asked.
    pub fn ensure_can_ask(&self) -> Result<(), SessionError> {
        self.ensure_state("ask", SessionState::Questioning)
    }

    /// Appends a learner question and the patient's reply as one step.
    ///
    /// Returns the recorded patient turn.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless `Questioning`
    /// - `Validation` if the speakers are not learner then patient
    pub fn record_exchange(
        &mut self,
        question: ConversationTurn,
        reply: ConversationTurn,
    ) -> Result<&ConversationTurn, SessionError> {
        self.ensure_can_ask()?;
        if question.speaker() != Speaker::Learner || reply.speaker() != Speaker::Patient {
            return Err(ValidationError::invalid_format(
                "turns",
                "an exchange is a learner question followed by a patient reply",
            )
            .into());
        }

        self.turns.push(question);
        self.turns.push(reply);
        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Stores the submission and moves to `Submitted`.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless `Questioning`
    pub fn submit(&mut self, submission: Submission) -> Result<(), SessionError> {
        self.advance("submit", SessionState::Submitted)?;
        self.submission = Some(submission);
        Ok(())
    }

    /// Checks that the session awaits evaluation and returns its submission.
    pub fn ensure_can_evaluate(&self) -> Result<&Submission, SessionError> {
        self.ensure_state("evaluate", SessionState::Submitted)?;
        self.submission
            .as_ref()
            .ok_or_else(|| SessionError::invalid_state("evaluate", self.state))
    }

    /// Stores feedback and seals the session as `Scored`.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless `Submitted`; a scored session is never re-scored
    pub fn record_feedback(
        &mut self,
        feedback: EvaluationFeedback,
    ) -> Result<&EvaluationFeedback, SessionError> {
        self.advance("evaluate", SessionState::Scored)?;
        self.scored_at = Some(Timestamp::now());
        Ok(&*self.feedback.insert(feedback))
    }

    /// Snapshot of a scored session, ready for history and reporting.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless `Scored`
    pub fn sealed_result(&self) -> Result<SealedResult, SessionError> {
        let not_sealed = || SessionError::invalid_state("seal", self.state);
        self.ensure_state("seal", SessionState::Scored)?;

        let submission = self.submission.clone().ok_or_else(not_sealed)?;
        let feedback = self.feedback.clone().ok_or_else(not_sealed)?;
        let scored_at = self.scored_at.ok_or_else(not_sealed)?;

        Ok(SealedResult::new(
            self.id,
            self.case_id.clone(),
            self.question_count(),
            submission,
            feedback,
            scored_at,
        ))
    }

    /// Checks that the session is scored and not yet in history, and returns
    /// the result to write.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless `Scored`
    /// - `AlreadyRecorded` if the result was written before
    pub fn ensure_can_record(&self) -> Result<SealedResult, SessionError> {
        if self.recorded {
            return Err(SessionError::AlreadyRecorded(self.id));
        }
        self.sealed_result()
    }

    /// Marks the sealed result as written to history.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless `Scored`
    /// - `AlreadyRecorded` if already marked
    pub fn mark_recorded(&mut self) -> Result<(), SessionError> {
        self.ensure_state("record", SessionState::Scored)?;
        if self.recorded {
            return Err(SessionError::AlreadyRecorded(self.id));
        }
        self.recorded = true;
        Ok(())
    }

    /// Returns true if the state/field invariants hold.
    pub fn is_consistent(&self) -> bool {
        let submission_ok = self.submission.is_some() == self.state.has_submission();
        let feedback_ok = self.feedback.is_some() == self.state.has_feedback();
        let scored_at_ok = self.scored_at.is_some() == self.state.has_feedback();
        let recorded_ok = !self.recorded || self.state == SessionState::Scored;
        let turns_ok = self.turns.chunks(2).all(|pair| {
            pair.len() == 2
                && pair[0].speaker() == Speaker::Learner
                && pair[1].speaker() == Speaker::Patient
        });
        submission_ok && feedback_ok && scored_at_ok && recorded_ok && turns_ok
    }

    fn ensure_state(&self, operation: &'static str, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::invalid_state(operation, self.state))
        }
    }

    fn advance(&mut self, operation: &'static str, target: SessionState) -> Result<(), SessionError> {
        self.state = self
            .state
            .transition_to(target)
            .map_err(|_| SessionError::invalid_state(operation, self.state))?;
        Ok(())
    }
}
