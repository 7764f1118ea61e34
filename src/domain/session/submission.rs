//! The learner's answer to a case.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Diagnosis, investigations and plan, fixed once submitted.
///
/// # Invariants
///
/// - `provisional_diagnosis` is non-empty after trimming
/// - `investigations` contains no blank entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    provisional_diagnosis: String,
    investigations: Vec<String>,
    management_plan: String,
}

impl Submission {
    /// Creates a submission, trimming fields and dropping blank investigations.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the diagnosis is blank
    pub fn new(
        provisional_diagnosis: impl Into<String>,
        investigations: Vec<String>,
        management_plan: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let provisional_diagnosis = provisional_diagnosis.into().trim().to_string();
        if provisional_diagnosis.is_empty() {
            return Err(ValidationError::empty_field("provisional_diagnosis"));
        }

        let investigations = investigations
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();

        Ok(Self {
            provisional_diagnosis,
            investigations,
            management_plan: management_plan.into().trim().to_string(),
        })
    }

    /// Splits a comma-separated list of investigations, as typed in a form.
    pub fn parse_investigations(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn provisional_diagnosis(&self) -> &str {
        &self.provisional_diagnosis
    }

    pub fn investigations(&self) -> &[String] {
        &self.investigations
    }

    pub fn management_plan(&self) -> &str {
        &self.management_plan
    }
}
