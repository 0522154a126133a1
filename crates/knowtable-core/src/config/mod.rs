//! Configuration management
//!
//! Settings are loaded once at the edge of the program (file, then
//! environment overrides) and handed to the services explicitly. Nothing in
//! the LLM layer reads the environment on its own.

use crate::error::{KnowtableError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the provider base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the completion model
pub const MODEL_ENV: &str = "KNOWTABLE_LLM_MODEL";
/// Environment variable overriding the embedding model
pub const EMBEDDING_MODEL_ENV: &str = "KNOWTABLE_EMBEDDING_MODEL";
/// Environment variable overriding the completion mode
pub const COMPLETION_MODE_ENV: &str = "KNOWTABLE_COMPLETION_MODE";
/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "KNOWTABLE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmSettings,
}

/// How structured completions are obtained from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Ask for a bare JSON object and validate it against the contract locally
    JsonObject,

    /// Send the contract as a JSON schema and let the provider enforce it
    #[default]
    NativeSchema,
}

impl CompletionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonObject => "json_object",
            Self::NativeSchema => "native_schema",
        }
    }
}

impl FromStr for CompletionMode {
    type Err = KnowtableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "json_object" | "json" => Ok(Self::JsonObject),
            "native_schema" | "schema" => Ok(Self::NativeSchema),
            other => Err(KnowtableError::Config(format!(
                "Unknown completion mode: {}",
                other
            ))),
        }
    }
}

/// LLM provider settings
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider API key. Without one every service runs in degraded mode.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override for OpenAI-compatible providers
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model name for chat completions
    #[serde(default = "default_model")]
    pub model: String,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Which service variant to build
    #[serde(default)]
    pub completion_mode: CompletionMode,
}

impl LlmSettings {
    /// Settings with defaults plus whatever the process environment overrides
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = Some(url);
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.model = model;
        }
        if let Some(model) = lookup(EMBEDDING_MODEL_ENV) {
            self.embedding_model = model;
        }
        if let Some(mode) = lookup(COMPLETION_MODE_ENV) {
            self.completion_mode = mode.parse()?;
        }
        Ok(())
    }

    /// The credential, if one is actually set. Blank keys count as missing.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Base URL override, if any. Blank values count as missing.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_completion_mode(mut self, mode: CompletionMode) -> Self {
        self.completion_mode = mode;
        self
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            embedding_model: default_embedding_model(),
            completion_mode: CompletionMode::default(),
        }
    }
}

// Keeps the API key out of logs and panic messages.
impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.credential().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("completion_mode", &self.completion_mode)
            .finish()
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

impl Config {
    /// Load config from the default path (or `KNOWTABLE_CONFIG`), then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = Self::load_from(&path)?;
        config.llm.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = LlmSettings::default();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.embedding_model, "text-embedding-3-small");
        assert_eq!(settings.completion_mode, CompletionMode::NativeSchema);
        assert!(settings.credential().is_none());
        assert!(settings.base_url().is_none());
    }

    #[test]
    fn test_blank_credential_is_absent() {
        let settings = LlmSettings::default().with_api_key("   ");
        assert!(settings.credential().is_none());

        let settings = LlmSettings::default().with_api_key(" sk-test ");
        assert_eq!(settings.credential(), Some("sk-test"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (API_KEY_ENV, "sk-env"),
            (BASE_URL_ENV, "http://localhost:8080/v1"),
            (MODEL_ENV, "gpt-4o-mini"),
            (COMPLETION_MODE_ENV, "json-object"),
        ]
        .into_iter()
        .collect();

        let mut settings = LlmSettings::default();
        settings
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.credential(), Some("sk-env"));
        assert_eq!(settings.base_url(), Some("http://localhost:8080/v1"));
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.embedding_model, "text-embedding-3-small");
        assert_eq!(settings.completion_mode, CompletionMode::JsonObject);
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        // Only this test touches KNOWTABLE_EMBEDDING_MODEL in the process
        std::env::set_var(EMBEDDING_MODEL_ENV, "embed-from-env");
        let settings = LlmSettings::from_env();
        std::env::remove_var(EMBEDDING_MODEL_ENV);

        let settings = settings.unwrap();
        assert_eq!(settings.embedding_model, "embed-from-env");
    }

    #[test]
    fn test_bad_mode_override() {
        let mut settings = LlmSettings::default();
        let result = settings.apply_overrides(|key| {
            (key == COMPLETION_MODE_ENV).then(|| "telepathy".to_string())
        });
        assert!(matches!(result, Err(KnowtableError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = LlmSettings::default().with_api_key("sk-secret");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("missing.yml")).unwrap();
        assert!(config.llm.credential().is_none());
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.llm.model = "gpt-4o-mini".to_string();
        config.llm.completion_mode = CompletionMode::JsonObject;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.llm.model, "gpt-4o-mini");
        assert_eq!(loaded.llm.completion_mode, CompletionMode::JsonObject);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  api_key: sk-file\n").unwrap();
        assert_eq!(config.llm.credential(), Some("sk-file"));
        assert_eq!(config.llm.embedding_model, "text-embedding-3-small");
        assert_eq!(config.llm.completion_mode, CompletionMode::NativeSchema);
    }
}
