//! The generation stage boundary.
//!
//! A [`StageClient`] performs one role-scoped text generation call. The
//! production implementation, [`ProviderStageClient`], maps the role to its
//! configured model and forwards a two-message chat request to a
//! [`tutorflow_llm::Provider`]. Retry policy lives entirely in the
//! orchestrator; nothing here retries or caches.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use tutorflow_llm::{ChatMessage, ChatRequest, Provider};
use tutorflow_types::config::StagesConfig;
use tutorflow_types::{Role, StageFailure};

/// One role-scoped remote text generation call.
#[async_trait]
pub trait StageClient: Send + Sync {
    /// Run `role` with the given instructions.
    ///
    /// On success the text is non-empty and trimmed. Any transport,
    /// authentication or malformed-response condition is a [`StageFailure`].
    async fn invoke(
        &self,
        role: Role,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, StageFailure>;
}

/// [`StageClient`] backed by an LLM [`Provider`].
pub struct ProviderStageClient {
    provider: Arc<dyn Provider>,
    stages: StagesConfig,
}

impl ProviderStageClient {
    /// Create a client sending every role to `provider` with the models in `stages`.
    pub fn new(provider: Arc<dyn Provider>, stages: StagesConfig) -> Self {
        Self { provider, stages }
    }

    /// The role to model mapping.
    pub fn stages(&self) -> &StagesConfig {
        &self.stages
    }

    fn build_request(&self, role: Role, system: &str, user: &str) -> ChatRequest {
        let stage = self.stages.get(role);
        let mut request = ChatRequest::new(
            stage.model.clone(),
            vec![ChatMessage::system(system), ChatMessage::user(user)],
        );
        request.temperature = stage.temperature;
        request.max_tokens = stage.max_tokens;
        request
    }
}

#[async_trait]
impl StageClient for ProviderStageClient {
    async fn invoke(
        &self,
        role: Role,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, StageFailure> {
        if system_instruction.trim().is_empty() {
            return Err(StageFailure::new(role, "system instruction is empty"));
        }
        if user_instruction.trim().is_empty() {
            return Err(StageFailure::new(role, "user instruction is empty"));
        }

        let request = self.build_request(role, system_instruction, user_instruction);
        debug!(
            %role,
            provider = %self.provider.name(),
            model = %request.model,
            user_chars = user_instruction.chars().count(),
            "invoking stage"
        );

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| StageFailure::new(role, e.to_string()))?;

        let text = response
            .first_text()
            .ok_or_else(|| StageFailure::new(role, "response contained no choices"))?
            .trim();
        if text.is_empty() {
            return Err(StageFailure::new(role, "empty completion"));
        }

        debug!(%role, chars = text.chars().count(), "stage completed");
        Ok(text.to_string())
    }
}

impl std::fmt::Debug for ProviderStageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderStageClient")
            .field("provider", &self.provider.name())
            .field("stages", &self.stages)
            .finish()
    }
}
