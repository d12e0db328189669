//! Chunker CLI - Main Entry Point
//!
//! Chunks files (or stdin) and prints the result as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chunker::batch::{BatchConfig, BatchProcessor};
use chunker::engine::ChunkingEngine;
use chunker::types::{ChunkConfig, ChunkStrategy, ChunkingConfig, ChunkingProfile, Metadata, SourceDocument};

#[derive(Parser)]
#[command(name = "chunker")]
#[command(version, about = "Split documents into bounded chunks for retrieval pipelines")]
struct Cli {
    /// Files to chunk; reads stdin when none are given
    files: Vec<PathBuf>,

    /// Named profile (default, small, large, markdown, fixed)
    #[arg(long)]
    profile: Option<String>,

    /// Chunking strategy
    #[arg(long)]
    strategy: Option<ChunkStrategy>,

    /// Target chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Chunks shorter than this are merged into a neighbour
    #[arg(long)]
    min_chunk_size: Option<usize>,

    /// Hard upper bound on chunk length
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Attach delimiters to the following chunk instead of the preceding one
    #[arg(long, default_value_t = false)]
    no_keep_separator: bool,

    /// Maximum files chunked concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Include summary statistics in the output
    #[arg(long, default_value_t = false)]
    stats: bool,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for chunk output
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "chunker=info".into()),
    );
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let env = ChunkingConfig::from_env();
    let config = resolve_config(&cli, &env)?;
    info!(
        strategy = %config.strategy(),
        chunk_size = config.chunk_size(),
        chunk_overlap = config.chunk_overlap(),
        max_chunk_size = config.max_chunk_size(),
        "Chunker v{}",
        env!("CARGO_PKG_VERSION")
    );

    let engine = Arc::new(ChunkingEngine::new(config));
    let documents = read_documents(&cli.files).await?;

    let output = if documents.len() == 1 {
        let document = &documents[0];
        let result = engine.chunk(&document.content, document.metadata.clone());
        if cli.stats {
            let stats = engine.get_stats(&result);
            json!({ "result": result, "stats": stats })
        } else {
            serde_json::to_value(&result)?
        }
    } else {
        let processor = BatchProcessor::new(
            Arc::clone(&engine),
            BatchConfig {
                concurrency: cli.concurrency.unwrap_or(env.batch_concurrency),
                continue_on_error: true,
            },
        );
        let batch = processor.process_batch(documents).await?;
        if cli.stats {
            let stats: Vec<_> = batch
                .results
                .iter()
                .map(|r| json!({ "id": r.id, "stats": engine.get_stats(&r.result) }))
                .collect();
            json!({ "batch": batch, "stats": stats })
        } else {
            serde_json::to_value(&batch)?
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}

/// Layer CLI flags over the selected profile and environment defaults.
fn resolve_config(cli: &Cli, env: &ChunkingConfig) -> Result<ChunkConfig> {
    let profile_name = cli.profile.as_deref().unwrap_or(&env.active_profile);

    let mut builder = if profile_name.eq_ignore_ascii_case("default") {
        env.builder()
    } else {
        let Some(profile) = ChunkingProfile::find(profile_name) else {
            bail!("Unknown profile: {profile_name}");
        };
        profile
            .builder()
            .keep_separator(env.keep_separator)
            .min_chunk_size(env.min_chunk_size)
    };

    if let Some(strategy) = cli.strategy {
        builder = builder.strategy(strategy);
    }
    if let Some(size) = cli.chunk_size {
        builder = builder.chunk_size(size);
    }
    if let Some(overlap) = cli.chunk_overlap {
        builder = builder.chunk_overlap(overlap);
    }
    if let Some(min) = cli.min_chunk_size {
        builder = builder.min_chunk_size(min);
    }
    if let Some(max) = cli.max_chunk_size {
        builder = builder.max_chunk_size(max);
    }
    if cli.no_keep_separator {
        builder = builder.keep_separator(false);
    }

    builder.build().context("Invalid chunking configuration")
}

/// Read each file into a document, or stdin when no files are given.
async fn read_documents(files: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    if files.is_empty() {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read stdin")?;
        return Ok(vec![SourceDocument::new("stdin", content)]);
    }

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let source = path.display().to_string();
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!(source));
        documents.push(SourceDocument {
            id: source,
            content,
            metadata,
        });
    }

    Ok(documents)
}
