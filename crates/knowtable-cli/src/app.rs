//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use knowtable_core::CompletionMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "knowtable")]
#[command(
    author,
    version,
    about = "Schema-validated LLM completions, embeddings and query decomposition"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Completion mode (overrides the configured one)
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a completion that conforms to an output contract
    Complete(CompleteArgs),

    /// Generate embeddings for texts
    Embed(EmbedArgs),

    /// Split a query into sub-queries
    Decompose(DecomposeArgs),

    /// Show LLM service configuration
    Status,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Prompt text
    #[arg(required = true)]
    pub prompt: Vec<String>,

    /// Output contract file (YAML or JSON)
    #[arg(short, long)]
    pub contract: PathBuf,
}

#[derive(Args)]
pub struct EmbedArgs {
    /// Texts to embed, one vector per argument
    pub texts: Vec<String>,
}

#[derive(Args)]
pub struct DecomposeArgs {
    /// Query text
    #[arg(required = true)]
    pub query: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    JsonObject,
    NativeSchema,
}

impl From<ModeArg> for CompletionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::JsonObject => CompletionMode::JsonObject,
            ModeArg::NativeSchema => CompletionMode::NativeSchema,
        }
    }
}
