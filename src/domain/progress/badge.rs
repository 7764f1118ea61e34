//! Skill badges and their thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Averages below this are `Beginner`.
pub const BEGINNER_MAX: f64 = 50.0;

/// Averages at or above this may earn `Pro`.
pub const PRO_MIN: f64 = 80.0;

/// Attempts needed before `Pro` can be awarded.
pub const PRO_MIN_ATTEMPTS: usize = 3;

/// Coarse skill tier. Ordered `Beginner < Intermediate < Pro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Beginner,
    Intermediate,
    Pro,
}

impl Badge {
    /// Tier for an average score and attempt count.
    ///
    /// Non-decreasing in `average` for a fixed `attempts`, and in `attempts`
    /// for a fixed `average`.
    pub fn for_progress(average: f64, attempts: usize) -> Self {
        if attempts == 0 || average.is_nan() || average < BEGINNER_MAX {
            Badge::Beginner
        } else if average >= PRO_MIN && attempts >= PRO_MIN_ATTEMPTS {
            Badge::Pro
        } else {
            Badge::Intermediate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::Beginner => "Beginner",
            Badge::Intermediate => "Intermediate",
            Badge::Pro => "Pro",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
