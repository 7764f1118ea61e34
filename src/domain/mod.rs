//! Domain layer containing the case engine's business rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, scores, timestamps, errors, state machine)
//! - `case` - Case definitions, rubric, catalog and selection policy
//! - `session` - The per-attempt state machine and its feedback
//! - `history` - Append-only attempt records
//! - `progress` - Badges and statistics derived from history

pub mod case;
pub mod foundation;
pub mod history;
pub mod progress;
pub mod session;
