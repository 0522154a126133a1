// Structured extraction example using Knowtable as a library
//
// Reads provider settings from the config file and environment. Without
// OPENAI_API_KEY the service runs degraded and prints "No answer".

use knowtable_core::{create_llm_service, Config, FieldKind, FieldSpec, LlmService, OutputContract};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Person {
    name: Option<String>,
    born: Option<i64>,
    fields: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> knowtable_core::Result<()> {
    println!("Knowtable Extraction Example\n");

    let config = Config::load()?;
    let service = create_llm_service(&config.llm)?;
    println!(
        "Mode: {} (model: {}, configured: {})",
        config.llm.completion_mode.as_str(),
        service.model_name(),
        service.is_configured()
    );

    let contract = OutputContract::new("person")
        .with_description("The main person described in the passage")
        .field(FieldSpec::optional("name", FieldKind::String))
        .field(FieldSpec::optional("born", FieldKind::Integer).with_description("Year of birth"))
        .field(FieldSpec::array("fields", FieldKind::String));

    let passage = "Ada Lovelace (born 1815) wrote the first published algorithm \
                   for Babbage's Analytical Engine and is remembered in mathematics and computing.";
    let prompt = format!("Extract the person described in this passage:\n\n{}", passage);

    match service.generate_completion(&prompt, &contract).await? {
        Some(output) => {
            let person: Person = output.decode()?;
            println!("\nName:   {:?}", person.name);
            println!("Born:   {:?}", person.born);
            println!("Fields: {:?}", person.fields);
        }
        None => println!("\nNo answer"),
    }

    let vectors = service.get_embeddings(&[passage.to_string()]).await;
    match vectors {
        Ok(v) if !v.is_empty() => println!("\nEmbedding dimensions: {}", v[0].len()),
        Ok(_) => println!("\nNo embeddings generated"),
        Err(e) => println!("\nEmbeddings unavailable: {}", e),
    }

    Ok(())
}
