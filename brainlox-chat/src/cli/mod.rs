use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::adapters::{GeminiChatModel, GeminiClient, GeminiEmbedder, WebCorpusLoader};
use crate::config::Config;
use crate::error::Result;
use crate::ports::EmbeddingGenerator;
use crate::services::{IndexBuilder, PipelineService, TextSplitter};

mod inspect;
mod serve;

#[derive(Parser)]
#[command(name = "brainlox-chat")]
#[command(about = "Chat API answering questions about BrainLox technical courses")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to global + project config)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Build the course index and serve the chat API")]
    Serve {
        #[arg(long, help = "Address to bind, e.g. 0.0.0.0:5000")]
        bind: Option<String>,
    },

    #[command(about = "Build the course index once and print its statistics")]
    Inspect {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => serve::run(config, bind).await,
        Commands::Inspect { json } => inspect::run(config, json).await,
    }
}

/// Wires the web loader and Gemini adapters into a pipeline service.
pub fn build_pipeline(config: &Config) -> Result<PipelineService> {
    let api_key = config.require_api_key()?;
    let timeout = Duration::from_secs(config.provider.timeout_secs);

    let loader = WebCorpusLoader::new(
        &config.corpus.source_url,
        &config.corpus.user_agent,
        timeout,
    )?;
    let client = GeminiClient::new(api_key, &config.provider.base_url, timeout)?;

    let embedder: Arc<dyn EmbeddingGenerator> = Arc::new(GeminiEmbedder::new(
        client.clone(),
        &config.embedding.model,
        config.embedding.batch_size,
        config.embedding.max_retries,
    ));
    let model = Arc::new(GeminiChatModel::new(
        client,
        &config.generation.model,
        config.generation.temperature,
    ));
    let splitter = TextSplitter::new(config.splitter.chunk_size, config.splitter.chunk_overlap)?;

    let builder = IndexBuilder::new(Arc::new(loader), embedder.clone(), splitter);
    Ok(PipelineService::new(
        builder,
        embedder,
        model,
        config.retrieval.top_k,
    ))
}
