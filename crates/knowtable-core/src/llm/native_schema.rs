//! Provider-native structured output
//!
//! The contract travels to the provider as a JSON schema and the provider
//! constrains generation to it. The parsed reply is still re-validated field
//! by field here, since providers and models drift in how faithfully they
//! honor a schema.

use super::client::{
    ChatCompletion, ChatMessage, ChatRequest, JsonSchemaFormat, ProviderClient, ResponseFormat,
};
use super::contract::{OutputContract, StructuredOutput};
use super::service::ClientState;
use super::traits::LlmService;
use crate::config::LlmSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Completion and embedding service using schema-constrained output
#[derive(Debug)]
pub struct NativeSchemaService {
    state: ClientState,
    model: String,
    embedding_model: String,
}

impl NativeSchemaService {
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
            embedding_model: settings.embedding_model.clone(),
        }
    }

    fn build_request(&self, prompt: &str, contract: &OutputContract) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            response_format: ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: contract.schema_name(),
                    schema: contract.json_schema(),
                    strict: contract.supports_strict_schema(),
                },
            },
        }
    }
}

fn read_parsed(completion: &ChatCompletion, contract: &OutputContract) -> Option<StructuredOutput> {
    let Some(parsed) = completion.parsed() else {
        match completion.refusal {
            Some(ref refusal) => tracing::warn!("LLM provider refused the request: {}", refusal),
            None if completion.is_truncated() => {
                tracing::warn!("LLM response hit the token limit before the JSON was complete")
            }
            None => tracing::warn!("Received no parsed response from LLM provider"),
        }
        return None;
    };

    match contract.validate(parsed) {
        Ok(output) if output.is_vacuous() => {
            tracing::info!("All fields in the response are null");
            None
        }
        Ok(output) => Some(output),
        Err(e) => {
            tracing::error!("Error validating response for contract '{}': {}", contract.name, e);
            None
        }
    }
}

#[async_trait]
impl LlmService for NativeSchemaService {
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

        Ok(read_parsed(&completion, contract))
    }

    async fn get_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let Some(client) = self.state.client() else {
            tracing::warn!("LLM client is not initialized. Skipping embeddings.");
            return Ok(Vec::new());
        };

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        client.embed_batch(&self.embedding_model, texts).await
    }

    fn is_configured(&self) -> bool {
        self.state.is_ready()
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn supports_embeddings(&self) -> bool {
        true
    }
}
