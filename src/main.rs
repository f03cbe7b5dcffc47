//! # askcorpus
//!
//! Question answering over a fixed document corpus: chunk and embed a
//! source document offline, then answer questions online by retrieving
//! the nearest chunks and grounding a language-model completion on them.
//!
//! Usage:
//!   askcorpus build                 # Build the index from the configured source
//!   askcorpus ask "a question"      # One-shot retrieval + completion
//!   askcorpus serve                 # Run the HTTP gateway

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use askcorpus_core::AskCorpusConfig;
use askcorpus_gateway::AppState;
use askcorpus_providers::OpenAiCompatibleClient;
use askcorpus_retrieval::{BuildOutcome, VectorStore, build_index};

#[derive(Parser)]
#[command(
    name = "askcorpus",
    version,
    about = "Question answering over a fixed document corpus"
)]
struct Cli {
    /// Path to config file (default: ~/.askcorpus/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the vector index from the source document
    Build {
        /// Source document path (overrides [storage].data_file)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Ask a single question from the terminal
    Ask {
        question: String,

        /// Number of chunks to retrieve (overrides [retrieval].top_k)
        #[arg(short)]
        k: Option<usize>,
    },
    /// Run the HTTP gateway
    Serve {
        /// Port to listen on (overrides [gateway].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Tilde-expand a configured path.
fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "askcorpus=debug,tower_http=debug"
    } else {
        "askcorpus=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => AskCorpusConfig::load_from(path)?,
        None => AskCorpusConfig::load()?,
    };

    match cli.command {
        Command::Build { data } => build(config, data).await,
        Command::Ask { question, k } => ask(config, &question, k).await,
        Command::Serve { port } => serve(config, port).await,
    }
}

async fn build(config: AskCorpusConfig, data: Option<PathBuf>) -> Result<()> {
    let data_file = data.unwrap_or_else(|| expand_path(&config.storage.data_file));
    let source = std::fs::read_to_string(&data_file)
        .with_context(|| format!("failed to read source document {}", data_file.display()))?;

    let client = OpenAiCompatibleClient::from_config(&config)?;
    let artifacts_dir = expand_path(&config.storage.artifacts_dir);

    match build_index(&source, &config.chunking, &client, &artifacts_dir).await? {
        BuildOutcome::Empty => {
            println!("No chunks produced from input file. Nothing to index.");
        }
        BuildOutcome::Built { chunks, dim } => {
            println!(
                "Indexed {chunks} chunks (dimension {dim}) into {}",
                artifacts_dir.display()
            );
        }
    }
    Ok(())
}

async fn ask(config: AskCorpusConfig, question: &str, k: Option<usize>) -> Result<()> {
    if question.trim().is_empty() {
        bail!("question must be a non-empty string");
    }

    let store = VectorStore::load(&expand_path(&config.storage.artifacts_dir))?;
    let client = OpenAiCompatibleClient::from_config(&config)?;
    let k = k.unwrap_or(config.retrieval.top_k);

    let answer = askcorpus_gateway::answer::answer(&store, &client, &client, question, k).await?;
    println!("{answer}");
    Ok(())
}

async fn serve(config: AskCorpusConfig, port: Option<u16>) -> Result<()> {
    let mut config = config;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    let store = VectorStore::load(&expand_path(&config.storage.artifacts_dir))?;
    tracing::info!(chunks = store.len(), dim = store.dim(), "vector store loaded");
    if store.is_empty() {
        tracing::warn!("vector store is empty; run `askcorpus build` before serving queries");
    }

    let client = Arc::new(OpenAiCompatibleClient::from_config(&config)?);
    let state = AppState {
        config,
        store,
        embeddings: client.clone(),
        llm: client,
    };

    askcorpus_gateway::start(state).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~/.askcorpus/embeddings"), home.join(".askcorpus/embeddings"));
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("data/corpus.txt"), PathBuf::from("data/corpus.txt"));
    }
}
