//! Progress snapshot computed from history entries.

use serde::Serialize;
use std::collections::HashSet;

use super::Badge;
use crate::domain::foundation::Score;
use crate::domain::history::HistoryEntry;

/// Derived statistics over every recorded attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub attempts_count: usize,
    /// Mean score; 0.0 when there are no attempts.
    pub average_score: f64,
    pub best_score: Option<Score>,
    pub distinct_cases: usize,
    pub badge: Badge,
}

impl ProgressSnapshot {
    /// Summarizes a history in any order. Pure and total.
    pub fn summarize(entries: &[HistoryEntry]) -> Self {
        let distinct_cases = entries
            .iter()
            .map(HistoryEntry::case_id)
            .collect::<HashSet<_>>()
            .len();

        Self {
            distinct_cases,
            ..Self::from_scores(entries.iter().map(HistoryEntry::score))
        }
    }

    /// Summarizes bare scores; `distinct_cases` is left at zero.
    pub fn from_scores(scores: impl IntoIterator<Item = Score>) -> Self {
        let mut attempts_count = 0usize;
        let mut total = 0u64;
        let mut best_score: Option<Score> = None;

        for score in scores {
            attempts_count += 1;
            total += u64::from(score.value());
            best_score = best_score.max(Some(score));
        }

        let average_score = if attempts_count == 0 {
            0.0
        } else {
            total as f64 / attempts_count as f64
        };

        Self {
            attempts_count,
            average_score,
            best_score,
            distinct_cases: 0,
            badge: Badge::for_progress(average_score, attempts_count),
        }
    }

    /// Returns false for an empty history, whose average is not meaningful.
    pub fn has_attempts(&self) -> bool {
        self.attempts_count > 0
    }

    /// Average rounded to one decimal place, for display.
    pub fn average_display(&self) -> String {
        if self.has_attempts() {
            format!("{:.1}", self.average_score)
        } else {
            "no attempts".to_string()
        }
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
