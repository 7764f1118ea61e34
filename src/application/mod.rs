//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands advance a case session; queries read the history.

pub mod handlers;

pub use handlers::{
    // Case session handlers
    AskPatientCommand, AskPatientHandler,
    EvaluateSubmissionHandler,
    ExportReportCommand, ExportReportHandler,
    RecordResultHandler,
    StartSessionCommand, StartSessionHandler, StartSessionResult,
    SubmitAnswerCommand, SubmitAnswerHandler,
    // Progress queries
    GetProgressHandler, ListHistoryHandler, ListHistoryQuery, DEFAULT_HISTORY_LIMIT,
};
