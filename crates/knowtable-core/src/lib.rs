//! Knowtable Core Library
//!
//! LLM service layer for the knowtable knowledge-extraction API.
//!
//! # Features
//! - Schema-validated completions against caller-defined output contracts
//! - Two completion strategies: JSON object mode and provider-native schemas
//! - Embeddings through the provider's embedding endpoint
//! - Degraded mode when no provider credential is configured

pub mod config;
pub mod error;
pub mod llm;

pub use config::{CompletionMode, Config, LlmSettings};
pub use error::{Error, KnowtableError, Result};
pub use llm::{
    create_llm_service, create_llm_service_with_client, decompose, ChatCompletion, ChatMessage,
    ChatRequest, ClientState, ContractViolation, FieldKind, FieldSpec, JsonModeService,
    JsonSchemaFormat, LlmService, NativeSchemaService, OpenAIClient, OutputContract,
    ProviderClient, QueryDecomposition, ResponseFormat, StructuredOutput,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "knowtable";
