//! Integration tests for a complete case attempt.
//!
//! Drives the application handlers end to end:
//! 1. Start a session (daily challenge or chosen case)
//! 2. Interview the patient through the LLM patient agent
//! 3. Submit an answer and have it scored by the LLM evaluator agent
//! 4. Record the result and read progress back from a file-backed history
//!
//! The chat-completion provider is the scripted `MockAIProvider`.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;

use docquest::adapters::{
    default_renderers, AgentSettings, JsonlHistoryStore, LlmEvaluatorAgent, LlmPatientAgent, MockAIProvider,
};
use docquest::adapters::ai::{MockError, MockResponse};
use docquest::application::{
    AskPatientCommand, AskPatientHandler, EvaluateSubmissionHandler, ExportReportCommand,
    ExportReportHandler, GetProgressHandler, ListHistoryHandler, ListHistoryQuery,
    RecordResultHandler, StartSessionCommand, StartSessionHandler, SubmitAnswerCommand,
    SubmitAnswerHandler,
};
use docquest::domain::case::CaseCatalog;
use docquest::domain::foundation::CaseId;
use docquest::domain::progress::Badge;
use docquest::domain::session::{CaseSession, SessionError, SessionState};
use docquest::ports::{FinishReason, HistoryStore, ReportFormat};

// =============================================================================
// Test Infrastructure
// =============================================================================

const CATALOG: &str = r#"{
    "cases": [
        {
            "id": "C1",
            "title": "Right lower quadrant pain",
            "category": "Surgery",
            "symptoms": ["abdominal pain", "nausea"],
            "presenting_complaint": "Pain in my belly since yesterday.",
            "hidden_findings": ["Pain migrated from the umbilicus"],
            "test_results": {"CBC": "WBC 14.2 with neutrophilia"},
            "reference_diagnosis": "Acute appendicitis",
            "reference_investigations": ["CBC", "USG abdomen"],
            "reference_plan": "IV antibiotics and surgical referral"
        },
        {
            "id": "C2",
            "title": "Crushing chest pain",
            "category": "Cardiology",
            "presenting_complaint": "Heavy chest pain for two hours.",
            "reference_diagnosis": "Acute myocardial infarction",
            "reference_plan": "Aspirin and primary PCI"
        }
    ]
}"#;

const EVALUATION_79: &str = r#"{
    "criteria": [
        {"id": "diagnosis", "score": 100},
        {"id": "investigations", "score": 70},
        {"id": "management", "score": 60}
    ],
    "strengths": ["Correct diagnosis"],
    "gaps": ["No pregnancy test"],
    "learning_points": ["Exclude ectopic pregnancy"],
    "red_flags": false
}"#;

const EVALUATION_90: &str = r#"{
    "criteria": [
        {"id": "diagnosis", "score": 100},
        {"id": "investigations", "score": 90},
        {"id": "management", "score": 77}
    ],
    "strengths": ["Complete work-up"],
    "gaps": [],
    "learning_points": [],
    "red_flags": false
}"#;

struct Engine {
    _dir: TempDir,
    patient_ai: MockAIProvider,
    evaluator_ai: MockAIProvider,
    history: Arc<JsonlHistoryStore>,
    start: StartSessionHandler,
    ask: AskPatientHandler,
    submit: SubmitAnswerHandler,
    evaluate: EvaluateSubmissionHandler,
    record: RecordResultHandler,
    progress: GetProgressHandler,
    list_history: ListHistoryHandler,
    export: ExportReportHandler,
}

async fn engine_with_timeout(timeout: Duration) -> Engine {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(CaseCatalog::from_json_str(CATALOG).unwrap());
    let history = Arc::new(
        JsonlHistoryStore::open(dir.path().join("history.jsonl"))
            .await
            .unwrap(),
    );

    let patient_ai = MockAIProvider::new();
    let evaluator_ai = MockAIProvider::new();
    let patient = Arc::new(LlmPatientAgent::new(
        Arc::new(patient_ai.clone()),
        AgentSettings::new(0.7, 300, timeout),
    ));
    let evaluator = Arc::new(LlmEvaluatorAgent::new(
        Arc::new(evaluator_ai.clone()),
        AgentSettings::new(0.2, 800, timeout),
    ));

    Engine {
        _dir: dir,
        patient_ai,
        evaluator_ai,
        history: history.clone(),
        start: StartSessionHandler::new(catalog.clone()),
        ask: AskPatientHandler::new(catalog.clone(), patient),
        submit: SubmitAnswerHandler::new(),
        evaluate: EvaluateSubmissionHandler::new(catalog.clone(), evaluator),
        record: RecordResultHandler::new(history.clone()),
        progress: GetProgressHandler::new(history.clone()),
        list_history: ListHistoryHandler::new(history),
        export: ExportReportHandler::new(catalog, default_renderers()),
    }
}

async fn engine() -> Engine {
    engine_with_timeout(Duration::from_secs(5)).await
}

fn start_case(engine: &Engine, id: &str) -> CaseSession {
    engine
        .start
        .handle(StartSessionCommand::Case {
            case_id: CaseId::new(id).unwrap(),
        })
        .unwrap()
        .session
}

fn scripted(content: &str) -> MockResponse {
    MockResponse::Success {
        content: content.to_string(),
        finish_reason: FinishReason::Stop,
    }
}

fn question(text: &str) -> AskPatientCommand {
    AskPatientCommand {
        question: text.to_string(),
    }
}

fn answer() -> SubmitAnswerCommand {
    SubmitAnswerCommand::from_text(
        "Acute appendicitis",
        "CBC, USG abdomen",
        "IV antibiotics and surgical referral",
    )
}

/// Runs submit, evaluate and record for a session that is still questioning.
async fn complete(engine: &Engine, session: &mut CaseSession, evaluation: &str) {
    engine.evaluator_ai.enqueue(scripted(evaluation));
    engine.submit.handle(session, answer()).unwrap();
    engine.evaluate.handle(session).await.unwrap();
    engine.record.handle(session).await.unwrap();
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_attempt_is_scored_and_recorded() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");

    engine.patient_ai.enqueue(scripted("It started around my belly button yesterday."));
    let reply = engine
        .ask
        .handle(&mut session, question("Where did the pain start?"))
        .await
        .unwrap();
    assert_eq!(reply.text(), "It started around my belly button yesterday.");

    engine.submit.handle(&mut session, answer()).unwrap();
    assert_eq!(session.state(), SessionState::Submitted);

    engine.evaluator_ai.enqueue(scripted(EVALUATION_79));
    let feedback = engine.evaluate.handle(&mut session).await.unwrap();
    assert_eq!(feedback.score().value(), 79);
    assert_eq!(session.state(), SessionState::Scored);

    let entry = engine.record.handle(&mut session).await.unwrap();
    assert_eq!(entry.case_id().as_str(), "C1");
    assert_eq!(entry.score().value(), 79);

    let stored = engine.history.read_all().await.unwrap();
    assert_eq!(stored, vec![entry]);
}

#[tokio::test]
async fn scored_session_is_written_to_history_once() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");
    engine.submit.handle(&mut session, answer()).unwrap();
    engine.evaluator_ai.enqueue(scripted(EVALUATION_79));
    engine.evaluate.handle(&mut session).await.unwrap();
    let mut copy = session.clone();

    engine.record.handle(&mut session).await.unwrap();
    let again = engine.record.handle(&mut session).await.unwrap_err();
    let from_copy = engine.record.handle(&mut copy).await.unwrap_err();

    assert_eq!(again, SessionError::AlreadyRecorded(*session.id()));
    assert_eq!(from_copy, SessionError::AlreadyRecorded(*session.id()));
    assert_eq!(engine.history.read_all().await.unwrap().len(), 1);
    assert_eq!(engine.progress.handle().await.unwrap().attempts_count, 1);
}

#[tokio::test]
async fn patient_receives_prior_exchanges() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");

    for reply in ["Since yesterday.", "Yes, I feel sick."] {
        engine.patient_ai.enqueue(scripted(reply));
    }
    engine
        .ask
        .handle(&mut session, question("When did it start?"))
        .await
        .unwrap();
    engine
        .ask
        .handle(&mut session, question("Any nausea?"))
        .await
        .unwrap();

    let calls = engine.patient_ai.get_calls();
    assert_eq!(calls.len(), 2);
    let second: Vec<&str> = calls[1].messages.iter().map(|m| m.content.as_str()).collect();
    assert!(second.contains(&"When did it start?"));
    assert!(second.contains(&"Since yesterday."));
    assert_eq!(second.last(), Some(&"Any nausea?"));
    assert_eq!(session.question_count(), 2);
}

#[tokio::test]
async fn reattempt_creates_a_new_session_and_entry() {
    let engine = engine().await;

    let mut first = start_case(&engine, "C1");
    complete(&engine, &mut first, EVALUATION_79).await;

    let mut second = engine
        .start
        .handle(StartSessionCommand::Case {
            case_id: first.case_id().clone(),
        })
        .unwrap()
        .session;
    assert_ne!(first.id(), second.id());
    assert_eq!(second.state(), SessionState::Questioning);
    assert!(second.turns().is_empty());

    complete(&engine, &mut second, EVALUATION_90).await;

    let entries = engine.history.read_all().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].session_id(), first.id());
    assert_eq!(entries[1].session_id(), second.id());
    assert_eq!(first.feedback().unwrap().score().value(), 79);
}

#[tokio::test]
async fn second_evaluation_is_rejected_without_calling_the_model() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");
    complete(&engine, &mut session, EVALUATION_79).await;
    assert_eq!(engine.evaluator_ai.call_count(), 1);

    let err = engine.evaluate.handle(&mut session).await.unwrap_err();

    assert!(matches!(err, SessionError::InvalidState { .. }));
    assert_eq!(engine.evaluator_ai.call_count(), 1);
    assert_eq!(session.feedback().unwrap().score().value(), 79);
}

#[tokio::test]
async fn malformed_evaluation_can_be_retried() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");
    engine.submit.handle(&mut session, answer()).unwrap();

    engine.evaluator_ai.enqueue(scripted("I'm sorry, I cannot grade this."));
    let err = engine.evaluate.handle(&mut session).await.unwrap_err();
    assert!(matches!(err, SessionError::EvaluationParse(_)));
    assert!(err.is_retryable());
    assert_eq!(session.state(), SessionState::Submitted);

    engine.evaluator_ai.enqueue(scripted(EVALUATION_79));
    let feedback = engine.evaluate.handle(&mut session).await.unwrap();
    assert_eq!(feedback.score().value(), 79);
}

#[tokio::test]
async fn provider_failure_leaves_the_conversation_unchanged() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");
    engine
        .patient_ai
        .enqueue(MockResponse::Error(MockError::Unavailable {
            message: "overloaded".into(),
        }));

    let err = engine
        .ask
        .handle(&mut session, question("Where does it hurt?"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Generation(_)));
    assert!(session.turns().is_empty());
    assert_eq!(session.state(), SessionState::Questioning);
}

#[tokio::test]
async fn slow_patient_times_out() {
    let slow_patient = MockAIProvider::new()
        .with_response("Too late")
        .with_delay(Duration::from_millis(500));
    let catalog = Arc::new(CaseCatalog::from_json_str(CATALOG).unwrap());
    let ask = AskPatientHandler::new(
        catalog,
        Arc::new(LlmPatientAgent::new(
            Arc::new(slow_patient),
            AgentSettings::new(0.7, 300, Duration::from_millis(50)),
        )),
    );
    let mut session = CaseSession::start(CaseId::new("C1").unwrap());

    let err = ask
        .handle(&mut session, question("Hello?"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::GenerationTimeout { .. }));
    assert!(session.turns().is_empty());
}

#[tokio::test]
async fn progress_reflects_recorded_attempts() {
    let engine = engine().await;
    let empty = engine.progress.handle().await.unwrap();
    assert_eq!(empty.attempts_count, 0);
    assert_eq!(empty.badge, Badge::Beginner);

    for (case, evaluation) in [("C1", EVALUATION_79), ("C2", EVALUATION_90), ("C1", EVALUATION_90)] {
        let mut session = start_case(&engine, case);
        complete(&engine, &mut session, evaluation).await;
    }

    let snapshot = engine.progress.handle().await.unwrap();
    assert_eq!(snapshot.attempts_count, 3);
    assert_eq!(snapshot.distinct_cases, 2);
    assert_eq!(snapshot.best_score.map(|s| s.value()), Some(90));
    // (79 + 90 + 90) / 3 = 86.33
    assert_eq!(snapshot.badge, Badge::Pro);

    let recent = engine
        .list_history
        .handle(ListHistoryQuery { limit: 2 })
        .await
        .unwrap();
    let scores: Vec<_> = recent.iter().map(|e| e.score().value()).collect();
    assert_eq!(scores, vec![90, 90]);
    assert_eq!(recent[0].case_id().as_str(), "C1");
}

#[tokio::test]
async fn daily_challenge_is_the_same_all_day() {
    let engine = engine().await;
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let morning = engine
        .start
        .handle(StartSessionCommand::TodayChallenge { date })
        .unwrap();
    let evening = engine
        .start
        .handle(StartSessionCommand::TodayChallenge { date })
        .unwrap();

    assert_eq!(morning.case.id(), evening.case.id());
    assert_ne!(morning.session.id(), evening.session.id());
}

#[tokio::test]
async fn scored_session_exports_html_report() {
    let engine = engine().await;
    let mut session = start_case(&engine, "C1");
    complete(&engine, &mut session, EVALUATION_79).await;

    let report = engine
        .export
        .handle(&session, ExportReportCommand { format: ReportFormat::Html })
        .unwrap();

    let html = String::from_utf8(report.content).unwrap();
    assert!(html.contains("Right lower quadrant pain"));
    assert!(html.contains("No pregnancy test"));
    assert!(report.filename.ends_with(".html"));
}
