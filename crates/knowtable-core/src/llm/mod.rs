//! LLM integration
//!
//! Provides the [`LlmService`] abstraction and its two variants:
//! - [`JsonModeService`]: JSON object mode, contract enforced locally
//! - [`NativeSchemaService`]: provider-native JSON schema output, plus embeddings
//!
//! Both sit on a [`ProviderClient`] that speaks the OpenAI-compatible API.

mod client;
mod contract;
mod json_mode;
mod native_schema;
mod query_decomposer;
mod service;
mod traits;

pub use client::{
    ChatCompletion, ChatMessage, ChatRequest, JsonSchemaFormat, OpenAIClient, ProviderClient,
    ResponseFormat, DEFAULT_BASE_URL,
};
pub use contract::{ContractViolation, FieldKind, FieldSpec, OutputContract, StructuredOutput};
pub use json_mode::JsonModeService;
pub use native_schema::NativeSchemaService;
pub use query_decomposer::{decompose, QueryDecomposition};
pub use service::{create_llm_service, create_llm_service_with_client, ClientState};
pub use traits::*;
