//! ListHistoryHandler - Recent attempts, newest first.

use std::sync::Arc;

use crate::domain::history::HistoryEntry;
use crate::domain::session::SessionError;
use crate::ports::HistoryStore;

/// Default number of entries shown on the dashboard.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Query for recent history.
#[derive(Debug, Clone, Copy)]
pub struct ListHistoryQuery {
    pub limit: usize,
}

impl Default for ListHistoryQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Handler for listing history.
pub struct ListHistoryHandler {
    history: Arc<dyn HistoryStore>,
}

impl ListHistoryHandler {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    pub async fn handle(&self, query: ListHistoryQuery) -> Result<Vec<HistoryEntry>, SessionError> {
        let entries = self
            .history
            .read_all()
            .await
            .map_err(|err| SessionError::Storage(err.to_string()))?;

        Ok(entries.into_iter().rev().take(query.limit).collect())
    }
}
