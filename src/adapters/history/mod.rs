//! History Store Adapters.
//!
//! - `JsonlHistoryStore` - Append-only JSON Lines file, safe across processes
//! - `InMemoryHistoryStore` - Vector-backed store for tests

mod in_memory_history_store;
mod jsonl_history_store;

pub use in_memory_history_store::InMemoryHistoryStore;
pub use jsonl_history_store::JsonlHistoryStore;
