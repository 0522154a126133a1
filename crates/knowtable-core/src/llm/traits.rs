//! LLM trait definitions

use super::contract::{OutputContract, StructuredOutput};
use super::query_decomposer::{decompose, QueryDecomposition};
use crate::error::{KnowtableError, Result};
use async_trait::async_trait;

/// Capabilities every LLM service variant offers.
///
/// A service without a credential never fails for that reason: completions
/// come back absent, embeddings empty, and decompositions trivial. Errors are
/// reserved for provider and transport failures.
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Generate a completion conforming to `contract`.
    ///
    /// `Ok(None)` means the provider gave no usable answer: nothing came back,
    /// the reply did not fit the contract, or every field was null.
    async fn generate_completion(
        &self,
        prompt: &str,
        contract: &OutputContract,
    ) -> Result<Option<StructuredOutput>>;

    /// Generate embeddings for a batch of texts
    async fn get_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.is_configured() {
            tracing::warn!("LLM client is not initialized. Skipping embeddings.");
            return Ok(Vec::new());
        }
        Err(KnowtableError::Unsupported(format!(
            "embeddings are not available in this completion mode ({} texts requested)",
            texts.len()
        )))
    }

    /// Split a query into sub-queries
    async fn decompose_query(&self, query: &str) -> QueryDecomposition {
        if !self.is_configured() {
            tracing::warn!("LLM client is not initialized. Skipping decomposition.");
        }
        decompose(query)
    }

    /// Whether a provider client was created at construction
    fn is_configured(&self) -> bool;

    /// Completion model name
    fn model_name(&self) -> &str;

    /// Whether `get_embeddings` can produce vectors when configured
    fn supports_embeddings(&self) -> bool {
        false
    }
}
