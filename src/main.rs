//! # Legal Document Pipeline Main Driver
//!
//! ## Purpose
//! Command-line entry point. Wires configuration, the generative-language
//! backend, the processing pipeline and the similarity store together.
//!
//! ## Input/Output Specification
//! - **Input**: Subcommand, configuration file, environment variables
//! - **Output**: Batch result JSON, store updates, or printed similarity ranks
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Validate the required API credential (startup-fatal when absent)
//! 4. Dispatch to batch processing, store ingestion, or a similarity query

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use legal_doc_pipeline::{
    config::Config,
    embed::HashingEmbedder,
    index::SimilarityIndex,
    llm::GeminiClient,
    pipeline::DocumentPipeline,
};

#[derive(Parser, Debug)]
#[command(
    name = "legal-doc-pipeline",
    version,
    about = "LLM-backed extraction and similarity pipeline for legal-case PDFs"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a directory of PDFs and write extracted records as JSON
    Process {
        /// Input directory (defaults to paths.pdf_dir from the config)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output JSON file (defaults to paths.output_file from the config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Ingest a directory of PDFs into the similarity store
    Build {
        /// Input directory (defaults to paths.pdf_dir from the config)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Rank stored documents by similarity to a query document
    Find {
        /// Query PDF path
        path: PathBuf,
        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
    /// Re-derive stored embeddings after an embedding-scheme change
    Rebuild,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config loading validates the required API key before any work starts.
    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;

    init_logging(&config);
    tracing::info!("Configuration loaded from {:?}", cli.config);

    let embedder = Arc::new(HashingEmbedder::new(config.store.embedding_dimension));

    match cli.command {
        Commands::Process { input, output } => {
            let input = input.unwrap_or_else(|| config.paths.pdf_dir.clone());
            let output = output.unwrap_or_else(|| config.paths.output_file.clone());
            tokio::fs::create_dir_all(&input).await?;

            let backend = Arc::new(GeminiClient::new(&config.llm)?);
            let pipeline = DocumentPipeline::new(&config, backend);
            let stats = pipeline.process_directory(&input, &output).await?;
            println!(
                "Processed {} documents: {} succeeded, {} failed",
                stats.total_processed, stats.succeeded, stats.failed
            );
        }
        Commands::Build { input } => {
            let input = input.unwrap_or_else(|| config.paths.pdf_dir.clone());
            let index = SimilarityIndex::open(&config.store, embedder)?;
            let stats = index.ingest_directory(&input).await?;
            index.flush()?;
            println!(
                "Ingested {} documents into the store ({} failed)",
                stats.ingested, stats.failed
            );
        }
        Commands::Find { path, top_k } => {
            let index = SimilarityIndex::open(&config.store, embedder)?;
            let results = index.find_similar(&path).await?;
            if results.is_empty() {
                println!("No documents in the similarity store");
            }
            for result in results.into_iter().take(top_k) {
                println!("{:>7.2}%  {}", result.similarity_score, result.filename);
            }
        }
        Commands::Rebuild => {
            let index = SimilarityIndex::open(&config.store, embedder)?;
            let rebuilt = index.rebuild()?;
            index.flush()?;
            println!("Rebuilt embeddings for {} entries", rebuilt);
        }
    }

    Ok(())
}

/// Initialize logging; RUST_LOG overrides the configured level.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
