//! Lifecycle state of a case session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Phase of a single case attempt.
///
/// Linear: `Questioning -> Submitted -> Scored`, no way back. A reattempt is a
/// new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Learner is interviewing the patient.
    #[default]
    Questioning,
    /// Diagnosis and plan submitted, awaiting evaluation.
    Submitted,
    /// Evaluated; the session is sealed.
    Scored,
}

impl SessionState {
    /// Returns true once a submission has been recorded.
    pub fn has_submission(&self) -> bool {
        matches!(self, SessionState::Submitted | SessionState::Scored)
    }

    /// Returns true once feedback has been recorded.
    pub fn has_feedback(&self) -> bool {
        matches!(self, SessionState::Scored)
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!((self, target), (Questioning, Submitted) | (Submitted, Scored))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Questioning => vec![Submitted],
            Submitted => vec![Scored],
            Scored => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Questioning => "QUESTIONING",
            SessionState::Submitted => "SUBMITTED",
            SessionState::Scored => "SCORED",
        };
        write!(f, "{}", s)
    }
}
