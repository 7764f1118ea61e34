//! History entry - one line of the append-only attempt log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CaseId, Score, SessionId};
use crate::domain::session::SealedResult;

/// Immutable record of one scored session.
///
/// Serialized as one JSON object per line:
/// `{"session_id", "case_id", "date", "score", "feedback_summary"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    session_id: SessionId,
    case_id: CaseId,
    date: NaiveDate,
    score: Score,
    feedback_summary: String,
}

impl HistoryEntry {
    /// Builds the entry for a sealed session, dated by its scoring time (UTC).
    pub fn from_sealed(result: &SealedResult) -> Self {
        Self {
            session_id: *result.session_id(),
            case_id: result.case_id().clone(),
            date: result.scored_at().date(),
            score: result.score(),
            feedback_summary: result.feedback().summary(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn feedback_summary(&self) -> &str {
        &self.feedback_summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::case::Rubric;
    use crate::domain::session::{CaseSession, Commentary, EvaluationFeedback, Submission};

    fn scored_session() -> CaseSession {
        let mut session = CaseSession::start(CaseId::new("C1").unwrap());
        session
            .submit(Submission::new("Appendicitis", vec![], "Surgery").unwrap())
            .unwrap();
        let feedback = EvaluationFeedback::from_criterion_scores(
            &Rubric::standard(),
            vec![
                ("diagnosis".into(), Score::new(100)),
                ("investigations".into(), Score::new(50)),
                ("management".into(), Score::new(50)),
            ],
            Commentary {
                gaps: vec!["No imaging".into()],
                ..Commentary::default()
            },
        )
        .unwrap();
        session.record_feedback(feedback).unwrap();
        session
    }

    #[test]
    fn from_sealed_copies_identity_and_score() {
        let session = scored_session();
        let sealed = session.sealed_result().unwrap();

        let entry = HistoryEntry::from_sealed(&sealed);
        assert_eq!(entry.session_id(), session.id());
        assert_eq!(entry.case_id().as_str(), "C1");
        assert_eq!(entry.score().value(), 70);
        assert_eq!(entry.feedback_summary(), "Gaps: No imaging");
        assert_eq!(entry.date(), sealed.scored_at().date());
    }

    #[test]
    fn serializes_as_flat_json_record() {
        let entry = HistoryEntry::from_sealed(&scored_session().sealed_result().unwrap());
        let value: serde_json::Value = serde_json::to_value(&entry).unwrap();

        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["case_id", "date", "feedback_summary", "score", "session_id"]
        );
        assert_eq!(value["score"], 70);
        assert_eq!(value["case_id"], "C1");
    }

    #[test]
    fn rejects_out_of_range_score_on_read() {
        let line = r#"{"session_id":"6f1c2b9e-7a43-4a53-9d8f-0c1e1b2a3d4e","case_id":"C1","date":"2024-03-14","score":140,"feedback_summary":""}"#;
        assert!(serde_json::from_str::<HistoryEntry>(line).is_err());
    }
}
