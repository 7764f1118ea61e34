//! Patient agent - answers in character from the case facts.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{with_budget, AgentSettings};
use crate::domain::case::Case;
use crate::domain::session::{ConversationTurn, Speaker};
use crate::ports::{
    AIProvider, AgentError, AgentRole, CompletionRequest, MessageRole, PatientAgent, RequestMetadata,
};

const PATIENT_SYSTEM_PROMPT: &str = "You are a standardized patient in a medical training \
simulation. Answer ONLY as the patient, using details from the case facts provided. \
Do not suggest diagnoses, tests or treatments. If the student asks for a test result that \
exists in the case, reveal exactly that result. If a test is not in the case, say \
\"Not available.\" Stay brief and realistic.";

/// `PatientAgent` backed by a chat-completion provider.
pub struct LlmPatientAgent {
    provider: Arc<dyn AIProvider>,
    settings: AgentSettings,
}

impl LlmPatientAgent {
    pub fn new(provider: Arc<dyn AIProvider>, settings: AgentSettings) -> Self {
        Self { provider, settings }
    }

    /// Agent with conversational defaults.
    pub fn with_defaults(provider: Arc<dyn AIProvider>) -> Self {
        Self::new(provider, AgentSettings::new(0.7, 300, Duration::from_secs(60)))
    }

    fn build_request(
        &self,
        case: &Case,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<CompletionRequest, AgentError> {
        let facts = serde_json::to_string(&case.patient_facts())
            .map_err(|e| AgentError::generation(format!("failed to encode case facts: {}", e)))?;

        let mut request = CompletionRequest::new(RequestMetadata::new(AgentRole::Patient, case.id().clone()))
            .with_system_prompt(PATIENT_SYSTEM_PROMPT)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_message(MessageRole::User, format!("Case facts: {}", facts));

        for turn in history {
            let role = match turn.speaker() {
                Speaker::Learner => MessageRole::User,
                Speaker::Patient => MessageRole::Assistant,
            };
            request = request.with_message(role, turn.text());
        }

        Ok(request.with_message(MessageRole::User, question))
    }
}

#[async_trait]
impl PatientAgent for LlmPatientAgent {
    async fn reply(
        &self,
        case: &Case,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, AgentError> {
        let request = self.build_request(case, history, question)?;

        tracing::debug!(
            case_id = %case.id(),
            prior_turns = history.len(),
            "Requesting patient reply"
        );

        let response = with_budget(self.settings.timeout, self.provider.complete(request)).await?;
        let reply = response.content.trim();
        if reply.is_empty() {
            return Err(AgentError::generation("patient reply was empty"));
        }

        Ok(reply.to_string())
    }
}
