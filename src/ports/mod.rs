//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Generation Ports
//!
//! - `AIProvider` - Chat-completion backend
//! - `PatientAgent` - In-character patient replies
//! - `EvaluatorAgent` - Rubric scoring of submissions
//!
//! ## Persistence and Output Ports
//!
//! - `HistoryStore` - Append-only attempt log
//! - `ReportRenderer` - Feedback report rendering

mod agents;
mod ai_provider;
mod history_store;
mod report_renderer;

pub use agents::{AgentError, EvaluatorAgent, PatientAgent};
pub use ai_provider::{
    AIError, AIProvider, AgentRole, CompletionRequest, CompletionResponse, FinishReason, Message, MessageRole,
    ProviderInfo, RequestMetadata, TokenUsage,
};
pub use history_store::{HistoryError, HistoryStore};
pub use report_renderer::{ExportError, ExportedReport, ReportFormat, ReportRenderer};
