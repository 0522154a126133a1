//! Embed command

use crate::app::{EmbedArgs, OutputFormat};
use anyhow::Result;
use knowtable_core::LlmService;

pub async fn run(args: EmbedArgs, service: &dyn LlmService, format: OutputFormat) -> Result<()> {
    let vectors = service.get_embeddings(&args.texts).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&vectors)?);
        }
        OutputFormat::Cli => {
            if vectors.is_empty() {
                println!("No embeddings generated");
            } else {
                println!("Embeddings:  {}", vectors.len());
                println!("Dimensions:  {}", vectors[0].len());
            }
        }
    }
    Ok(())
}
