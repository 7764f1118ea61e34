//! History domain module.
//!
//! The audit record written once per scored session.

mod entry;

pub use entry::HistoryEntry;
