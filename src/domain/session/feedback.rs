//! Structured evaluation feedback and rubric scoring.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::case::Rubric;
use crate::domain::foundation::{Score, ValidationError};

/// Maximum length, in characters, of a history summary line.
pub const MAX_SUMMARY_CHARS: usize = 280;

/// Sub-score awarded for one rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: Score,
    pub weight: f64,
}

impl CriterionScore {
    /// Contribution of this criterion to the total, before rounding.
    pub fn weighted(&self) -> f64 {
        self.score.value() as f64 * self.weight
    }
}

/// Result of evaluating a submission against a case rubric.
///
/// # Invariants
///
/// - `criterion_scores` covers every rubric criterion exactly once, in rubric order
/// - `score` is the rounded weighted sum of `criterion_scores`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationFeedback {
    score: Score,
    criterion_scores: Vec<CriterionScore>,
    strengths: Vec<String>,
    gaps: Vec<String>,
    learning_points: Vec<String>,
    /// Evaluator flagged an unsafe omission.
    red_flags: bool,
}

/// Qualitative part of an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commentary {
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub learning_points: Vec<String>,
    pub red_flags: bool,
}

impl EvaluationFeedback {
    /// Scores a submission from per-criterion sub-scores.
    ///
    /// The total is computed here rather than trusted from the evaluator, so
    /// the same sub-scores always give the same total.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if a criterion is missing, unknown or scored twice
    pub fn from_criterion_scores(
        rubric: &Rubric,
        scores: Vec<(String, Score)>,
        commentary: Commentary,
    ) -> Result<Self, ValidationError> {
        let mut by_id: HashMap<String, Score> = HashMap::with_capacity(scores.len());
        for (id, score) in scores {
            let id = id.trim().to_string();
            if rubric.get(&id).is_none() {
                return Err(ValidationError::invalid_format(
                    "criteria",
                    format!("unknown criterion '{}'", id),
                ));
            }
            if by_id.insert(id.clone(), score).is_some() {
                return Err(ValidationError::invalid_format(
                    "criteria",
                    format!("criterion '{}' scored more than once", id),
                ));
            }
        }

        let mut criterion_scores = Vec::with_capacity(rubric.len());
        for criterion in rubric.criteria() {
            let score = by_id.get(&criterion.id).copied().ok_or_else(|| {
                ValidationError::invalid_format(
                    "criteria",
                    format!("missing score for criterion '{}'", criterion.id),
                )
            })?;
            criterion_scores.push(CriterionScore {
                criterion: criterion.id.clone(),
                score,
                weight: criterion.weight,
            });
        }

        let total = criterion_scores.iter().map(CriterionScore::weighted).sum::<f64>();

        Ok(Self {
            score: Score::from_rounded(total),
            criterion_scores,
            strengths: clean(commentary.strengths),
            gaps: clean(commentary.gaps),
            learning_points: clean(commentary.learning_points),
            red_flags: commentary.red_flags,
        })
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn criterion_scores(&self) -> &[CriterionScore] {
        &self.criterion_scores
    }

    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    pub fn gaps(&self) -> &[String] {
        &self.gaps
    }

    pub fn learning_points(&self) -> &[String] {
        &self.learning_points
    }

    pub fn red_flags(&self) -> bool {
        self.red_flags
    }

    /// One-line summary stored alongside the score in history.
    ///
    /// Prefers gaps, then strengths; capped at [`MAX_SUMMARY_CHARS`].
    pub fn summary(&self) -> String {
        let line = if !self.gaps.is_empty() {
            format!("Gaps: {}", self.gaps.join("; "))
        } else if !self.strengths.is_empty() {
            format!("Strengths: {}", self.strengths.join("; "))
        } else {
            format!("Scored {}", self.score)
        };
        truncate_chars(&line, MAX_SUMMARY_CHARS)
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
