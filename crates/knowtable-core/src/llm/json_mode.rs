//! JSON object mode completions
//!
//! The provider is only asked for "some JSON object"; the contract is
//! enforced entirely on our side by parsing the returned text.

use super::client::{ChatCompletion, ChatMessage, ChatRequest, ProviderClient, ResponseFormat};
use super::contract::{OutputContract, StructuredOutput};
use super::service::ClientState;
use super::traits::LlmService;
use crate::config::LlmSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Completion service using the provider's JSON object mode
#[derive(Debug)]
pub struct JsonModeService {
    state: ClientState,
    model: String,
}

impl JsonModeService {
    /// Create from settings; runs degraded when no credential is configured
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self::with_state(settings, ClientState::from_settings(settings)?))
    }

    /// Create on top of an existing provider client
    pub fn with_client(settings: &LlmSettings, client: Arc<dyn ProviderClient>) -> Self {
        Self::with_state(settings, ClientState::Ready(client))
    }

    pub fn with_state(settings: &LlmSettings, state: ClientState) -> Self {
        Self {
            state,
            model: settings.model.clone(),
        }
    }

    fn build_request(&self, prompt: &str, contract: &OutputContract) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(prompt, contract))],
            response_format: ResponseFormat::JsonObject,
        }
    }
}

/// The provider only constrains the reply to "some JSON object", so the field
/// names and types travel in the prompt. The instructions also satisfy JSON
/// object mode's demand that the messages mention JSON.
fn build_prompt(prompt: &str, contract: &OutputContract) -> String {
    format!("{}\n\n{}", prompt, contract.render_instructions())
}

/// Turn raw completion text into a contract value, or nothing
fn read_completion(completion: &ChatCompletion, contract: &OutputContract) -> Option<StructuredOutput> {
    let Some(body) = completion.body() else {
        tracing::warn!("Received empty response from LLM provider");
        return None;
    };
    if completion.is_truncated() {
        tracing::warn!("LLM response hit the token limit and may be incomplete");
    }

    match contract.parse_json(body) {
        Ok(output) if output.is_vacuous() => {
            tracing::info!("All fields in the response are null");
            None
        }
        Ok(output) => Some(output),
        Err(e) => {
            tracing::error!("Error parsing response for contract '{}': {}", contract.name, e);
            None
        }
    }
}

#[async_trait]
impl LlmService for JsonModeService {
    async fn generate_completion(
        &self,
        prompt: &str,
        contract: &OutputContract,
    ) -> Result<Option<StructuredOutput>> {
        let Some(client) = self.state.client() else {
            tracing::warn!("LLM client is not initialized. Skipping generation.");
            return Ok(None);
        };

        let request = self.build_request(prompt, contract);
        let completion = client.chat_completion(&request).await?;
        tracing::debug!("Generated response: {:?}", completion.content);

        Ok(read_completion(&completion, contract))
    }

    fn is_configured(&self) -> bool {
        self.state.is_ready()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
