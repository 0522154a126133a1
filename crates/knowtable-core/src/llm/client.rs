//! HTTP client for OpenAI-compatible LLM providers
//!
//! Every network round-trip the services make goes through [`ProviderClient`],
//! so tests can swap the transport for a stub.

use crate::error::{KnowtableError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default endpoint when no base URL override is configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Transport to an LLM provider
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Run a single chat completion
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Embed a batch of texts, one vector per text in input order
    async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Output format directive sent with a completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Any syntactically valid JSON object
    JsonObject,

    /// JSON conforming to the attached schema
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

/// Completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

/// The part of a completion response the services care about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub refusal: Option<String>,
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// Completion carrying plain text content
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Completion where the model refused to answer
    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            refusal: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Generation stopped at the token limit, so the body is likely cut off
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }

    /// Message body, if there is any non-blank text
    pub fn body(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// The provider-side parse of a schema-constrained reply.
    ///
    /// `None` when the model refused, produced nothing, or produced something
    /// other than a JSON object.
    pub fn parsed(&self) -> Option<Value> {
        if self.refusal.is_some() {
            return None;
        }
        match serde_json::from_str::<Value>(self.body()?) {
            Ok(value @ Value::Object(_)) => Some(value),
            _ => None,
        }
    }
}

/// OpenAI-compatible client
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAIClient {
    /// Create a client for the given credential and optional endpoint
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(KnowtableError::Http)?;

        Ok(Self {
            http_client,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KnowtableError::from_status(status, body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProviderClient for OpenAIClient {
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let response: ApiChatResponse = self.post_json("chat/completions", request).await?;
        Ok(response.into())
    }

    async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest { model, input: texts };
        let response: EmbedResponse = self.post_json("embeddings", &request).await?;

        tracing::debug!(
            "Received {} embeddings for {} texts",
            response.data.len(),
            texts.len()
        );

        Ok(response.into_vectors())
    }
}

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct ApiChatResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl From<ApiChatResponse> for ChatCompletion {
    fn from(response: ApiChatResponse) -> Self {
        match response.choices.into_iter().next() {
            Some(choice) => Self {
                content: choice.message.content,
                refusal: choice.message.refusal,
                finish_reason: choice.finish_reason,
            },
            None => Self::default(),
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl EmbedResponse {
    fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}
