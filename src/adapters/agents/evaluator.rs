//! Evaluator agent - scores a submission against the case rubric.
//!
//! The model returns per-criterion sub-scores as JSON; the weighted total is
//! computed locally by `EvaluationFeedback`, never taken from the model.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::{with_budget, AgentSettings};
use crate::domain::case::{Case, Rubric};
use crate::domain::foundation::Score;
use crate::domain::session::{Commentary, EvaluationFeedback, Submission};
use crate::ports::{
    AIProvider, AgentError, AgentRole, CompletionRequest, EvaluatorAgent, MessageRole, RequestMetadata,
};

/// `EvaluatorAgent` backed by a chat-completion provider.
pub struct LlmEvaluatorAgent {
    provider: Arc<dyn AIProvider>,
    settings: AgentSettings,
}

impl LlmEvaluatorAgent {
    pub fn new(provider: Arc<dyn AIProvider>, settings: AgentSettings) -> Self {
        Self { provider, settings }
    }

    /// Agent with low-temperature defaults.
    pub fn with_defaults(provider: Arc<dyn AIProvider>) -> Self {
        Self::new(provider, AgentSettings::new(0.2, 800, Duration::from_secs(90)))
    }

    fn system_prompt(rubric: &Rubric) -> String {
        let criteria = rubric
            .criteria()
            .iter()
            .map(|c| format!("- \"{}\" (weight {:.2}): {}", c.id, c.weight, c.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are a medical tutor for an educational simulation (not real medical advice). \
            Compare the student's diagnosis, investigations and initial plan to the case's gold \
            answer.\n\n\
            Score every criterion from 0 to 100:\n{}\n\n\
            Return STRICT JSON with keys:\n\
            - criteria (array of {{\"id\": string, \"score\": number}}, one per criterion)\n\
            - strengths (array of short strings)\n\
            - gaps (array of short strings)\n\
            - learning_points (array of short strings)\n\
            - red_flags (boolean, true if the plan misses something unsafe)\n\
            Do not include any text outside JSON.",
            criteria
        )
    }

    fn build_request(&self, case: &Case, submission: &Submission) -> Result<CompletionRequest, AgentError> {
        let payload = json!({
            "student_answer": {
                "diagnosis": submission.provisional_diagnosis(),
                "investigations": submission.investigations(),
                "plan": submission.management_plan(),
            },
            "gold_case": {
                "presenting_complaint": case.presenting_complaint(),
                "reference": case.reference_answer(),
            },
        });
        let payload = serde_json::to_string(&payload)
            .map_err(|e| AgentError::generation(format!("failed to encode submission: {}", e)))?;

        Ok(CompletionRequest::new(RequestMetadata::new(AgentRole::Evaluator, case.id().clone()))
            .with_system_prompt(Self::system_prompt(case.rubric()))
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_json_output()
            .with_message(MessageRole::User, payload))
    }
}

#[async_trait]
impl EvaluatorAgent for LlmEvaluatorAgent {
    async fn evaluate(
        &self,
        case: &Case,
        submission: &Submission,
    ) -> Result<EvaluationFeedback, AgentError> {
        let request = self.build_request(case, submission)?;

        tracing::debug!(case_id = %case.id(), "Requesting evaluation");

        let response = with_budget(self.settings.timeout, self.provider.complete(request)).await?;
        parse_evaluation(&response.content, case.rubric()).map_err(|err| {
            tracing::warn!(case_id = %case.id(), error = %err, "Unparsable evaluation output");
            err
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    criteria: Vec<RawCriterion>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    gaps: Vec<String>,
    #[serde(default)]
    learning_points: Vec<String>,
    #[serde(default)]
    red_flags: bool,
}

#[derive(Debug, Deserialize)]
struct RawCriterion {
    id: String,
    score: f64,
}

/// Maps raw evaluator output onto feedback for `rubric`.
///
/// Accepts the JSON object bare, inside a markdown code fence, or surrounded
/// by stray prose. The first `{` that starts a well-formed evaluation wins, so
/// braces in leading prose are skipped.
///
/// # Errors
///
/// - `Parse` if no JSON object is found, it does not match the contract, a
///   sub-score is outside 0-100, or criteria do not match the rubric
pub fn parse_evaluation(output: &str, rubric: &Rubric) -> Result<EvaluationFeedback, AgentError> {
    let raw = first_evaluation(output)?;

    let mut scores = Vec::with_capacity(raw.criteria.len());
    for criterion in raw.criteria {
        if !criterion.score.is_finite() || !(0.0..=100.0).contains(&criterion.score) {
            return Err(AgentError::parse(format!(
                "score for '{}' out of range: {}",
                criterion.id, criterion.score
            )));
        }
        scores.push((criterion.id, Score::from_rounded(criterion.score)));
    }

    let commentary = Commentary {
        strengths: raw.strengths,
        gaps: raw.gaps,
        learning_points: raw.learning_points,
        red_flags: raw.red_flags,
    };

    EvaluationFeedback::from_criterion_scores(rubric, scores, commentary)
        .map_err(|e| AgentError::parse(e.to_string()))
}

fn first_evaluation(output: &str) -> Result<RawEvaluation, AgentError> {
    let mut first_error = None;
    for (start, _) in output.match_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&output[start..]).into_iter::<RawEvaluation>();
        match stream.next() {
            Some(Ok(raw)) => return Ok(raw),
            Some(Err(err)) => {
                first_error.get_or_insert(err);
            }
            None => {}
        }
    }

    Err(match first_error {
        Some(err) => AgentError::parse(err.to_string()),
        None => AgentError::parse("no JSON object in evaluator output"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::CaseId;

    const GOOD_OUTPUT: &str = r#"{
        "criteria": [
            {"id": "diagnosis", "score": 100},
            {"id": "investigations", "score": 70},
            {"id": "management", "score": 60}
        ],
        "strengths": ["Correct diagnosis"],
        "gaps": ["No pregnancy test"],
        "learning_points": ["Exclude ectopic pregnancy in women of childbearing age"],
        "red_flags": false
    }"#;

    fn case() -> Case {
        Case::new(
            CaseId::new("C1").unwrap(),
            "RLQ pain",
            "Surgery",
            "Abdominal pain since yesterday",
            "Acute appendicitis",
            "Surgical referral",
        )
        .with_reference_investigations(vec!["CBC".into(), "USG abdomen".into()])
    }

    fn submission() -> Submission {
        Submission::new("Appendicitis", vec!["CBC".into(), "USG".into()], "Surgical referral")
            .unwrap()
    }

    #[test]
    fn parses_bare_json_and_computes_total() {
        let feedback = parse_evaluation(GOOD_OUTPUT, &Rubric::standard()).unwrap();
        // 0.4 * 100 + 0.3 * 70 + 0.3 * 60 = 79
        assert_eq!(feedback.score().value(), 79);
        assert_eq!(feedback.strengths(), &["Correct diagnosis"]);
        assert_eq!(feedback.gaps(), &["No pregnancy test"]);
        assert_eq!(feedback.learning_points().len(), 1);
        assert!(!feedback.red_flags());
    }

    #[test]
    fn tolerates_code_fences_and_prose() {
        let fenced = format!("Here is my assessment:\n```json\n{}\n```\nGood luck!", GOOD_OUTPUT);
        let feedback = parse_evaluation(&fenced, &Rubric::standard()).unwrap();
        assert_eq!(feedback.score().value(), 79);
    }

    #[test]
    fn braces_in_leading_prose_are_skipped() {
        let output = format!(
            "Scores use the {{diagnosis, investigations, management}} rubric.\n{}\nNote: {{end}}",
            GOOD_OUTPUT
        );
        let feedback = parse_evaluation(&output, &Rubric::standard()).unwrap();
        assert_eq!(feedback.score().value(), 79);
    }

    #[test]
    fn missing_feedback_lists_default_to_empty() {
        let output = r#"{"criteria": [
            {"id": "diagnosis", "score": 50},
            {"id": "investigations", "score": 50},
            {"id": "management", "score": 50}
        ]}"#;
        let feedback = parse_evaluation(output, &Rubric::standard()).unwrap();
        assert_eq!(feedback.score().value(), 50);
        assert!(feedback.strengths().is_empty());
        assert!(feedback.gaps().is_empty());
    }

    #[test]
    fn non_json_output_is_parse_error() {
        let err = parse_evaluation("I think the student did well.", &Rubric::standard()).unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let output = r#"{"diagnosis_score": 4, "tests_score": 3, "plan_score": 2}"#;
        let err = parse_evaluation(output, &Rubric::standard()).unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn out_of_range_score_is_parse_error() {
        let output = r#"{"criteria": [
            {"id": "diagnosis", "score": 140},
            {"id": "investigations", "score": 50},
            {"id": "management", "score": 50}
        ]}"#;
        let err = parse_evaluation(output, &Rubric::standard()).unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn missing_criterion_is_parse_error() {
        let output = r#"{"criteria": [{"id": "diagnosis", "score": 100}]}"#;
        let err = parse_evaluation(output, &Rubric::standard()).unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn system_prompt_lists_rubric_criteria() {
        let prompt = LlmEvaluatorAgent::system_prompt(&Rubric::standard());
        assert!(prompt.contains("\"diagnosis\" (weight 0.40)"));
        assert!(prompt.contains("\"management\" (weight 0.30)"));
    }

    #[tokio::test]
    async fn evaluate_sends_reference_and_submission_as_json() {
        let provider = MockAIProvider::new().with_response(GOOD_OUTPUT);
        let agent = LlmEvaluatorAgent::with_defaults(Arc::new(provider.clone()));

        let feedback = agent.evaluate(&case(), &submission()).await.unwrap();
        assert_eq!(feedback.score().value(), 79);

        let calls = provider.get_calls();
        assert!(calls[0].json_output);
        let payload: serde_json::Value = serde_json::from_str(&calls[0].messages[0].content).unwrap();
        assert_eq!(payload["student_answer"]["diagnosis"], "Appendicitis");
        assert_eq!(payload["gold_case"]["reference"]["diagnosis"], "Acute appendicitis");
        assert_eq!(payload["gold_case"]["reference"]["investigations"][1], "USG abdomen");
    }

    #[tokio::test]
    async fn evaluate_surfaces_provider_timeout() {
        let provider = MockAIProvider::new().with_error(MockError::Timeout { timeout_secs: 90 });
        let agent = LlmEvaluatorAgent::with_defaults(Arc::new(provider));

        let err = agent.evaluate(&case(), &submission()).await.unwrap_err();
        assert_eq!(err, AgentError::Timeout { timeout_secs: 90 });
    }

    #[tokio::test]
    async fn evaluate_surfaces_unparsable_output() {
        let provider = MockAIProvider::new().with_response("not json at all");
        let agent = LlmEvaluatorAgent::with_defaults(Arc::new(provider));

        let err = agent.evaluate(&case(), &submission()).await.unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }
}
