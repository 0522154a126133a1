//! Decompose command

use crate::app::{DecomposeArgs, OutputFormat};
use anyhow::Result;
use knowtable_core::LlmService;

pub async fn run(args: DecomposeArgs, service: &dyn LlmService, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let decomposition = service.decompose_query(&query).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&decomposition)?);
        }
        OutputFormat::Cli => {
            for (i, sub_query) in decomposition.sub_queries.iter().enumerate() {
                println!("{}. {}", i + 1, sub_query);
            }
        }
    }
    Ok(())
}
