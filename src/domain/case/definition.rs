//! Case definition and scoring rubric.
//!
//! A case is a fixed clinical scenario. Part of it is shown to the learner
//! (title, description, symptoms, presenting complaint), part is only revealed
//! by the patient when asked (hidden findings, test results), and the reference
//! answers are only ever seen by the evaluator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{CaseId, ValidationError};

/// Tolerance when checking that rubric weights sum to 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// One weighted criterion of a rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    /// Stable identifier the evaluator must echo back (e.g. `"diagnosis"`).
    pub id: String,
    /// What the evaluator should judge for this criterion.
    pub description: String,
    /// Share of the total score, in (0, 1].
    pub weight: f64,
}

impl RubricCriterion {
    pub fn new(id: impl Into<String>, description: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            weight,
        }
    }
}

/// Ordered, weighted scoring criteria for a case.
///
/// # Invariants
///
/// - At least one criterion
/// - Criterion ids are unique and non-empty
/// - Every weight is finite and strictly positive
/// - Weights sum to 1.0 (within [`WEIGHT_TOLERANCE`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RubricCriterion>", into = "Vec<RubricCriterion>")]
pub struct Rubric(Vec<RubricCriterion>);

impl Rubric {
    /// Creates a rubric, validating its invariants.
    pub fn try_new(criteria: Vec<RubricCriterion>) -> Result<Self, ValidationError> {
        if criteria.is_empty() {
            return Err(ValidationError::empty_field("rubric"));
        }

        for (i, criterion) in criteria.iter().enumerate() {
            if criterion.id.trim().is_empty() {
                return Err(ValidationError::empty_field("rubric.id"));
            }
            if criteria[..i].iter().any(|c| c.id == criterion.id) {
                return Err(ValidationError::invalid_format(
                    "rubric",
                    format!("duplicate criterion '{}'", criterion.id),
                ));
            }
            if !criterion.weight.is_finite() || criterion.weight <= 0.0 {
                return Err(ValidationError::invalid_format(
                    "rubric",
                    format!("criterion '{}' must have a positive weight", criterion.id),
                ));
            }
        }

        let total: f64 = criteria.iter().map(|c| c.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ValidationError::invalid_format(
                "rubric",
                format!("weights must sum to 1.0, got {total}"),
            ));
        }

        Ok(Self(criteria))
    }

    /// The default rubric: diagnosis 40%, investigations 30%, management 30%.
    pub fn standard() -> Self {
        Self(vec![
            RubricCriterion::new(
                "diagnosis",
                "Accuracy of the provisional diagnosis against the reference diagnosis",
                0.4,
            ),
            RubricCriterion::new(
                "investigations",
                "Relevance and completeness of the key investigations requested",
                0.3,
            ),
            RubricCriterion::new(
                "management",
                "Safety and appropriateness of the initial management plan",
                0.3,
            ),
        ])
    }

    /// Returns the criteria in rubric order.
    pub fn criteria(&self) -> &[RubricCriterion] {
        &self.0
    }

    /// Looks up a criterion by id.
    pub fn get(&self, id: &str) -> Option<&RubricCriterion> {
        self.0.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Rubric {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<RubricCriterion>> for Rubric {
    type Error = ValidationError;

    fn try_from(criteria: Vec<RubricCriterion>) -> Result<Self, Self::Error> {
        Self::try_new(criteria)
    }
}

impl From<Rubric> for Vec<RubricCriterion> {
    fn from(rubric: Rubric) -> Self {
        rubric.0
    }
}

/// An immutable clinical case definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    id: CaseId,
    title: String,
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    symptoms: Vec<String>,
    presenting_complaint: String,
    #[serde(default)]
    hidden_findings: Vec<String>,
    /// Investigation name → result, revealed only when the learner asks.
    #[serde(default)]
    test_results: BTreeMap<String, String>,
    reference_diagnosis: String,
    #[serde(default)]
    reference_investigations: Vec<String>,
    reference_plan: String,
    #[serde(default)]
    rubric: Rubric,
}

/// The part of a case the patient may draw on when answering.
///
/// Reference answers are deliberately absent.
#[derive(Debug, Clone, Serialize)]
pub struct PatientFacts<'a> {
    pub presenting_complaint: &'a str,
    pub description: &'a str,
    pub symptoms: &'a [String],
    pub hidden_findings: &'a [String],
    pub test_results: &'a BTreeMap<String, String>,
}

/// The gold answer the evaluator compares a submission against.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceAnswer<'a> {
    pub diagnosis: &'a str,
    pub investigations: &'a [String],
    pub management_plan: &'a str,
}

impl Case {
    /// Creates a case with the standard rubric and no optional details.
    pub fn new(
        id: CaseId,
        title: impl Into<String>,
        category: impl Into<String>,
        presenting_complaint: impl Into<String>,
        reference_diagnosis: impl Into<String>,
        reference_plan: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            category: category.into(),
            description: String::new(),
            symptoms: Vec::new(),
            presenting_complaint: presenting_complaint.into(),
            hidden_findings: Vec::new(),
            test_results: BTreeMap::new(),
            reference_diagnosis: reference_diagnosis.into(),
            reference_investigations: Vec::new(),
            reference_plan: reference_plan.into(),
            rubric: Rubric::standard(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.symptoms = symptoms;
        self
    }

    pub fn with_hidden_findings(mut self, findings: Vec<String>) -> Self {
        self.hidden_findings = findings;
        self
    }

    pub fn with_test_result(mut self, test: impl Into<String>, result: impl Into<String>) -> Self {
        self.test_results.insert(test.into(), result.into());
        self
    }

    pub fn with_reference_investigations(mut self, investigations: Vec<String>) -> Self {
        self.reference_investigations = investigations;
        self
    }

    pub fn with_rubric(mut self, rubric: Rubric) -> Self {
        self.rubric = rubric;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &CaseId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn presenting_complaint(&self) -> &str {
        &self.presenting_complaint
    }

    pub fn hidden_findings(&self) -> &[String] {
        &self.hidden_findings
    }

    pub fn test_results(&self) -> &BTreeMap<String, String> {
        &self.test_results
    }

    pub fn reference_diagnosis(&self) -> &str {
        &self.reference_diagnosis
    }

    pub fn reference_investigations(&self) -> &[String] {
        &self.reference_investigations
    }

    pub fn reference_plan(&self) -> &str {
        &self.reference_plan
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Facts the simulated patient is allowed to know.
    pub fn patient_facts(&self) -> PatientFacts<'_> {
        PatientFacts {
            presenting_complaint: &self.presenting_complaint,
            description: &self.description,
            symptoms: &self.symptoms,
            hidden_findings: &self.hidden_findings,
            test_results: &self.test_results,
        }
    }

    /// The gold answer used for evaluation.
    pub fn reference_answer(&self) -> ReferenceAnswer<'_> {
        ReferenceAnswer {
            diagnosis: &self.reference_diagnosis,
            investigations: &self.reference_investigations,
            management_plan: &self.reference_plan,
        }
    }
}
