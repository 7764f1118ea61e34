//! Conversation turns exchanged during the questioning phase.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Learner,
    Patient,
}

/// One immutable line of the interview.
///
/// # Invariants
///
/// - `text` is non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    speaker: Speaker,
    text: String,
    timestamp: Timestamp,
}

impl ConversationTurn {
    /// Creates a turn stamped with the current time.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if text is blank
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            let field = match speaker {
                Speaker::Learner => "question",
                Speaker::Patient => "reply",
            };
            return Err(ValidationError::empty_field(field));
        }
        Ok(Self {
            speaker,
            text,
            timestamp: Timestamp::now(),
        })
    }

    /// Creates a learner question.
    pub fn learner(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Speaker::Learner, text)
    }

    /// Creates a patient reply.
    pub fn patient(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Speaker::Patient, text)
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }
}
