//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod case_session;
pub mod progress;

pub use case_session::{
    AskPatientCommand, AskPatientHandler, EvaluateSubmissionHandler, ExportReportCommand,
    ExportReportHandler, RecordResultHandler, StartSessionCommand, StartSessionHandler,
    StartSessionResult, SubmitAnswerCommand, SubmitAnswerHandler,
};
pub use progress::{GetProgressHandler, ListHistoryHandler, ListHistoryQuery, DEFAULT_HISTORY_LIMIT};
