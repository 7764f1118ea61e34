//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the case engine.

mod errors;
mod ids;
mod score;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{CaseId, SessionId};
pub use score::Score;
pub use state_machine::{StateMachine, TransitionError};
pub use timestamp::Timestamp;
