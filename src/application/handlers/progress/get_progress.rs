//! GetProgressHandler - Aggregate statistics over the whole history.

use std::sync::Arc;

use crate::domain::progress::ProgressSnapshot;
use crate::domain::session::SessionError;
use crate::ports::HistoryStore;

/// Handler for the progress dashboard.
pub struct GetProgressHandler {
    history: Arc<dyn HistoryStore>,
}

impl GetProgressHandler {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    /// Summarizes every recorded attempt.
    pub async fn handle(&self) -> Result<ProgressSnapshot, SessionError> {
        let entries = self
            .history
            .read_all()
            .await
            .map_err(|err| SessionError::Storage(err.to_string()))?;

        let snapshot = ProgressSnapshot::summarize(&entries);
        tracing::debug!(
            attempts = snapshot.attempts_count,
            badge = %snapshot.badge,
            "Computed progress"
        );
        Ok(snapshot)
    }
}
