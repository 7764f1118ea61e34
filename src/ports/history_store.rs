//! History Store Port - Append-only log of scored attempts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, SessionId};
use crate::domain::history::HistoryEntry;

/// Append-only record of every scored session.
///
/// # Contract
///
/// Implementations must:
/// - Never rewrite, reorder or delete existing entries
/// - Make each `append` atomic at record granularity, even when called
///   concurrently from different sessions
/// - Return entries from `read_all` in write order, oldest first
/// - Return an empty vector, not an error, for an empty store
/// - Reject an entry whose `session_id` they already hold with `Duplicate`
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Durably appends one entry.
    async fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError>;

    /// Reads every entry in write order.
    async fn read_all(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
}

/// History storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// I/O failure; the append did not happen.
    #[error("history I/O error: {0}")]
    Io(String),

    /// An entry for this session was appended before; nothing was written.
    #[error("history already holds session {0}")]
    Duplicate(SessionId),

    /// Entry could not be serialized.
    #[error("failed to serialize history entry: {0}")]
    Serialization(String),
}

impl HistoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HistoryError::Duplicate(_) => ErrorCode::InvalidState,
            _ => ErrorCode::StorageError,
        }
    }

    /// I/O failures may clear up; serialization failures will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HistoryError::Io(_))
    }
}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_io_failures_are_retryable() {
        assert!(HistoryError::Io("disk full".into()).is_retryable());
        assert!(!HistoryError::Serialization("bad".into()).is_retryable());

        let duplicate = HistoryError::Duplicate(SessionId::new());
        assert!(!duplicate.is_retryable());
        assert_eq!(duplicate.code(), ErrorCode::InvalidState);
    }
}
