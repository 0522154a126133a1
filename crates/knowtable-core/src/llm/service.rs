//! Service construction
//!
//! Whether a provider client exists is decided exactly once, when a service
//! is built. The decision is carried as a [`ClientState`] for the service's
//! whole lifetime.

use super::client::{OpenAIClient, ProviderClient};
use super::json_mode::JsonModeService;
use super::native_schema::NativeSchemaService;
use super::traits::LlmService;
use crate::config::{CompletionMode, LlmSettings};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Provider client availability
#[derive(Clone)]
pub enum ClientState {
    /// Credential present, client created
    Ready(Arc<dyn ProviderClient>),

    /// No credential: the service runs degraded
    Unconfigured,
}

impl ClientState {
    /// Create the provider client if the settings carry a credential
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        match settings.credential() {
            Some(api_key) => {
                let client = OpenAIClient::new(api_key, settings.base_url())?;
                tracing::info!("LLM client ready at {}", client.base_url());
                Ok(Self::Ready(Arc::new(client)))
            }
            None => {
                tracing::warn!("OpenAI API key is not set. LLM features will be disabled.");
                Ok(Self::Unconfigured)
            }
        }
    }

    pub fn client(&self) -> Option<&dyn ProviderClient> {
        match self {
            Self::Ready(client) => Some(client.as_ref()),
            Self::Unconfigured => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Debug for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready"),
            Self::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

/// Build the service variant selected by `settings.completion_mode`
pub fn create_llm_service(settings: &LlmSettings) -> Result<Arc<dyn LlmService>> {
    let state = ClientState::from_settings(settings)?;
    Ok(service_with_state(settings, state))
}

/// Build the configured service variant on top of an existing client
pub fn create_llm_service_with_client(
    settings: &LlmSettings,
    client: Arc<dyn ProviderClient>,
) -> Arc<dyn LlmService> {
    service_with_state(settings, ClientState::Ready(client))
}

fn service_with_state(settings: &LlmSettings, state: ClientState) -> Arc<dyn LlmService> {
    tracing::debug!(
        "Building {} LLM service (model {}, {:?})",
        settings.completion_mode.as_str(),
        settings.model,
        state
    );
    match settings.completion_mode {
        CompletionMode::JsonObject => Arc::new(JsonModeService::with_state(settings, state)),
        CompletionMode::NativeSchema => Arc::new(NativeSchemaService::with_state(settings, state)),
    }
}
