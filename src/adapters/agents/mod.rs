//! LLM-backed agent adapters.
//!
//! Implement the `PatientAgent` and `EvaluatorAgent` ports on top of any
//! `AIProvider`, with prompt assembly, time budgets and output parsing.

mod evaluator;
mod patient;

pub use evaluator::{parse_evaluation, LlmEvaluatorAgent};
pub use patient::LlmPatientAgent;

use std::future::Future;
use std::time::Duration;

use crate::ports::{AIError, AgentError};

/// Generation parameters shared by both agents.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one generation call, retries included.
    pub timeout: Duration,
}

impl AgentSettings {
    pub fn new(temperature: f32, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            temperature,
            max_tokens,
            timeout,
        }
    }
}

/// Runs a provider call under the agent's time budget.
async fn with_budget<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, AIError>>,
) -> Result<T, AgentError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(AgentError::from),
        Err(_) => Err(AgentError::Timeout {
            timeout_secs: timeout.as_secs().max(1),
        }),
    }
}
