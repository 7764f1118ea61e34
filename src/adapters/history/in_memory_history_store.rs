//! In-Memory History Store Adapter
//!
//! Keeps entries in a vector. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::history::HistoryEntry;
use crate::ports::{HistoryError, HistoryStore};

/// In-memory append-only history.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.session_id() == entry.session_id()) {
            return Err(HistoryError::Duplicate(*entry.session_id()));
        }
        entries.push(entry.clone());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.entries.read().await.clone())
    }
}
