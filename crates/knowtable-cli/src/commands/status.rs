//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use knowtable_core::llm::DEFAULT_BASE_URL;
use knowtable_core::{LlmService, LlmSettings};

pub async fn run(settings: &LlmSettings, service: &dyn LlmService, format: OutputFormat) -> Result<()> {
    let base_url = settings.base_url().unwrap_or(DEFAULT_BASE_URL);
    let credential = if service.is_configured() {
        "configured"
    } else {
        "not configured"
    };

    match format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "credential": credential,
                "completion_mode": settings.completion_mode.as_str(),
                "model": service.model_name(),
                "embedding_model": settings.embedding_model,
                "base_url": base_url,
                "embeddings": service.supports_embeddings(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Cli => {
            println!("Credential:      {}", credential);
            println!("Completion mode: {}", settings.completion_mode.as_str());
            println!("Model:           {}", service.model_name());
            println!("Base URL:        {}", base_url);
            println!();
            println!("Embeddings:");
            println!("  Supported:     {}", if service.supports_embeddings() { "yes" } else { "no" });
            println!("  Model:         {}", settings.embedding_model);
        }
    }
    Ok(())
}
