//! Complete command

use crate::app::{CompleteArgs, OutputFormat};
use anyhow::{Context, Result};
use knowtable_core::{LlmService, OutputContract};
use std::path::Path;

pub async fn run(args: CompleteArgs, service: &dyn LlmService, format: OutputFormat) -> Result<()> {
    let contract = load_contract(&args.contract)?;
    let prompt = args.prompt.join(" ");
    tracing::debug!(
        "Loaded contract '{}' with {} fields",
        contract.name,
        contract.fields.len()
    );

    let result = service.generate_completion(&prompt, &contract).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Cli => match result {
            Some(output) => {
                let width = output.fields().keys().map(|k| k.len()).max().unwrap_or(0) + 1;
                for (name, value) in output.fields() {
                    println!("{:<width$} {}", format!("{}:", name), display_value(value));
                }
            }
            None => println!("No answer"),
        },
    }
    Ok(())
}

/// Contracts are YAML; JSON files parse the same way
fn load_contract(path: &Path) -> Result<OutputContract> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read contract file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid contract file {}", path.display()))
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
