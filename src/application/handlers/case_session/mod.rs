//! Case session handlers - One attempt at a case, from start to recorded result.

mod ask_patient;
mod evaluate_submission;
mod export_report;
mod record_result;
mod start_session;
mod submit_answer;

pub use ask_patient::{AskPatientCommand, AskPatientHandler};
pub use evaluate_submission::EvaluateSubmissionHandler;
pub use export_report::{ExportReportCommand, ExportReportHandler};
pub use record_result::RecordResultHandler;
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
pub use submit_answer::{SubmitAnswerCommand, SubmitAnswerHandler};
