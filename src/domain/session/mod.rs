//! Session domain module.
//!
//! The three-state machine governing one attempt at a case:
//! `Questioning -> Submitted -> Scored`. A reattempt is a new session bound to
//! the same case id; a scored session is never mutated.

mod aggregate;
mod errors;
mod feedback;
mod sealed;
mod state;
mod submission;
mod turn;

pub use aggregate::CaseSession;
pub use errors::SessionError;
pub use feedback::{Commentary, CriterionScore, EvaluationFeedback, MAX_SUMMARY_CHARS};
pub use sealed::SealedResult;
pub use state::SessionState;
pub use submission::Submission;
pub use turn::{ConversationTurn, Speaker};
