//! Progress handlers - Read-only views over the history.

mod get_progress;
mod list_history;

pub use get_progress::GetProgressHandler;
pub use list_history::{ListHistoryHandler, ListHistoryQuery, DEFAULT_HISTORY_LIMIT};
