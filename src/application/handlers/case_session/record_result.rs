//! RecordResultHandler - Appends a scored session to history.

use std::sync::Arc;

use crate::domain::history::HistoryEntry;
use crate::domain::session::{CaseSession, SessionError};
use crate::ports::{HistoryError, HistoryStore};

/// Handler for persisting results.
pub struct RecordResultHandler {
    history: Arc<dyn HistoryStore>,
}

impl RecordResultHandler {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    /// Appends the single history entry of a scored session and marks the
    /// session recorded.
    ///
    /// After a `Storage` failure the session stays unrecorded and the call
    /// can be repeated.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is `Scored`
    /// - `AlreadyRecorded` if the session, or a copy of it, was recorded before
    /// - `Storage` if the append fails; nothing was written
    pub async fn handle(&self, session: &mut CaseSession) -> Result<HistoryEntry, SessionError> {
        let sealed = session.ensure_can_record()?;
        let entry = HistoryEntry::from_sealed(&sealed);

        match self.history.append(&entry).await {
            Ok(()) => {}
            Err(HistoryError::Duplicate(session_id)) => {
                tracing::warn!(%session_id, "History already holds this session");
                session.mark_recorded()?;
                return Err(SessionError::AlreadyRecorded(session_id));
            }
            Err(err) => {
                tracing::error!(
                    session_id = %session.id(),
                    error = %err,
                    "Failed to append history entry"
                );
                return Err(SessionError::Storage(err.to_string()));
            }
        }
        session.mark_recorded()?;

        tracing::info!(
            session_id = %entry.session_id(),
            case_id = %entry.case_id(),
            score = entry.score().value(),
            "Recorded result"
        );
        Ok(entry)
    }
}
