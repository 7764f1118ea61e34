//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - Chat-completion providers (OpenAI-compatible, mock)
//! - `agents` - LLM-backed patient and evaluator agents
//! - `history` - Append-only history stores (JSON Lines file, in-memory)
//! - `report` - Feedback report renderers (Markdown, HTML)

pub mod agents;
pub mod ai;
pub mod history;
pub mod report;

pub use agents::{AgentSettings, LlmEvaluatorAgent, LlmPatientAgent};
pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use history::{InMemoryHistoryStore, JsonlHistoryStore};
pub use report::{default_renderers, HtmlReportRenderer, MarkdownReportRenderer};
