//! ragtrio CLI - compare three RAG retrieval strategies over one document
//!
//! # Commands
//!
//! ```bash
//! # Chunk a document and show results
//! ragtrio chunk os_sertoes.pdf --size 4000 --overlap 20
//!
//! # Embed text and show vector stats
//! ragtrio embed "Como é descrito o sertão?"
//!
//! # Ask the fixed questions through every pipeline
//! ragtrio ask os_sertoes.pdf --pipeline all --index-dir .ragtrio
//!
//! # Only look at what the rerank pipeline retrieves
//! ragtrio ask os_sertoes.pdf --pipeline rerank --question "Who was Antônio Conselheiro?" --dry-run
//! ```
//!
//! Credentials and endpoints come from flags or the environment
//! (`OPENAI_API_KEY`, `COHERE_API_KEY`, `RAGTRIO_*`). Set `RUST_LOG=info`
//! to see indexing progress.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use ragtrio_lib::{
    chunk::{Chunker, FixedSizeChunker},
    embed::{Embedder, OpenAiEmbedder, OpenAiEmbedderConfig},
    generate::{Generator, OpenAiGenerator, OpenAiGeneratorConfig},
    load::{load_document, Page},
    pipeline::{build_retriever, index_cached, Pipeline, PipelineKind},
    questions::QUESTIONS,
    rerank::{CohereReranker, CohereRerankerConfig, Reranker},
    retrieve::{IndexStats, Retriever},
    store::SearchResult,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ragtrio")]
#[command(about = "Compare naive, parent-document and rerank retrieval over a PDF")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    services: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Hosted service settings shared by every subcommand
#[derive(Args)]
struct ServiceArgs {
    /// OpenAI API key, used for embeddings and generation
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "RAGTRIO_OPENAI_BASE", default_value = "https://api.openai.com/v1", global = true)]
    openai_base_url: String,

    #[arg(long, env = "RAGTRIO_EMBEDDING_MODEL", default_value = "text-embedding-3-small", global = true)]
    embedding_model: String,

    #[arg(long, env = "RAGTRIO_CHAT_MODEL", default_value = "gpt-4o-mini", global = true)]
    chat_model: String,

    /// Cohere API key, used by the rerank pipeline
    #[arg(long, env = "COHERE_API_KEY", hide_env_values = true, global = true)]
    cohere_api_key: Option<String>,

    #[arg(long, env = "RAGTRIO_COHERE_BASE", default_value = "https://api.cohere.com/v1", global = true)]
    cohere_base_url: String,

    #[arg(long, env = "RAGTRIO_RERANK_MODEL", default_value = "rerank-multilingual-v3.0", global = true)]
    rerank_model: String,

    /// Per-request timeout for every hosted service
    #[arg(long, env = "RAGTRIO_TIMEOUT_SECS", default_value = "60", global = true)]
    timeout_secs: u64,

    /// Maximum texts per embeddings request
    #[arg(long, env = "RAGTRIO_EMBED_BATCH", default_value = "64", global = true)]
    batch_size: usize,

    /// Run embedding and reranking in-process instead of calling the APIs
    #[cfg(feature = "local")]
    #[arg(long, global = true)]
    local: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a document into fixed-size chunks and preview them
    Chunk {
        /// Input document (PDF or text)
        input: PathBuf,

        /// Chunk size in characters
        #[arg(long, default_value = "4000")]
        size: usize,

        /// Characters shared by consecutive chunks
        #[arg(long, default_value = "20")]
        overlap: usize,
    },

    /// Embed text and show vector info
    Embed {
        /// Text to embed
        text: String,

        /// Treat as query rather than document
        #[arg(short, long)]
        query: bool,
    },

    /// Answer questions about a document with one or more pipelines
    Ask {
        /// Input document (PDF or text)
        input: PathBuf,

        /// Pipelines to run: naive, parent, rerank (comma separated) or all
        #[arg(short, long, default_value = "all", value_parser = parse_selection)]
        pipeline: Selection,

        /// Question to ask; repeat for several. Defaults to the built-in set
        #[arg(short, long = "question")]
        questions: Vec<String>,

        /// Print retrieved context without calling the chat model
        #[arg(long)]
        dry_run: bool,

        /// Directory for index snapshots, reused between runs
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
}

/// Pipelines picked with `--pipeline`, deduplicated, in the order given
#[derive(Debug, Clone)]
struct Selection(Vec<PipelineKind>);

fn parse_selection(s: &str) -> std::result::Result<Selection, String> {
    if s.trim().eq_ignore_ascii_case("all") {
        return Ok(Selection(PipelineKind::ALL.to_vec()));
    }

    let mut kinds = Vec::new();
    for name in s.split(',') {
        let kind = name.parse::<PipelineKind>().map_err(|e| e.to_string())?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(Selection(kinds))
}

impl ServiceArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn openai_key(&self) -> Result<String> {
        self.openai_api_key
            .clone()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set (or pass --openai-api-key)"))
    }

    fn cohere_key(&self) -> Result<String> {
        self.cohere_api_key
            .clone()
            .ok_or_else(|| anyhow!("COHERE_API_KEY is not set (or pass --cohere-api-key)"))
    }

    #[cfg(feature = "local")]
    fn use_local(&self) -> bool {
        self.local
    }

    #[cfg(not(feature = "local"))]
    fn use_local(&self) -> bool {
        false
    }

    fn embedder(&self) -> Result<Box<dyn Embedder>> {
        if self.use_local() {
            return local_embedder();
        }

        let config = OpenAiEmbedderConfig {
            base_url: self.openai_base_url.clone(),
            model: self.embedding_model.clone(),
            timeout: self.timeout(),
            batch_size: self.batch_size,
            ..OpenAiEmbedderConfig::new(self.openai_key()?)
        };
        let embedder = OpenAiEmbedder::new(config).context("failed to build embeddings client")?;
        Ok(Box::new(embedder))
    }

    fn reranker(&self) -> Result<Box<dyn Reranker>> {
        if self.use_local() {
            return local_reranker();
        }

        let config = CohereRerankerConfig {
            base_url: self.cohere_base_url.clone(),
            model: self.rerank_model.clone(),
            timeout: self.timeout(),
            ..CohereRerankerConfig::new(self.cohere_key()?)
        };
        let reranker = CohereReranker::new(config).context("failed to build rerank client")?;
        Ok(Box::new(reranker))
    }

    fn generator(&self) -> Result<Box<dyn Generator>> {
        let config = OpenAiGeneratorConfig {
            base_url: self.openai_base_url.clone(),
            model: self.chat_model.clone(),
            timeout: self.timeout(),
            ..OpenAiGeneratorConfig::new(self.openai_key()?)
        };
        let generator = OpenAiGenerator::new(config).context("failed to build chat client")?;
        Ok(Box::new(generator))
    }
}

#[cfg(feature = "local")]
fn local_embedder() -> Result<Box<dyn Embedder>> {
    println!("Loading local embedding model (first run downloads it)...");
    let embedder = ragtrio_lib::embed::LocalEmbedder::new().context("failed to load local embedder")?;
    Ok(Box::new(embedder))
}

#[cfg(not(feature = "local"))]
fn local_embedder() -> Result<Box<dyn Embedder>> {
    Err(anyhow!("built without the `local` feature"))
}

#[cfg(feature = "local")]
fn local_reranker() -> Result<Box<dyn Reranker>> {
    println!("Loading local reranker model (first run downloads it)...");
    let reranker = ragtrio_lib::rerank::LocalReranker::new().context("failed to load local reranker")?;
    Ok(Box::new(reranker))
}

#[cfg(not(feature = "local"))]
fn local_reranker() -> Result<Box<dyn Reranker>> {
    Err(anyhow!("built without the `local` feature"))
}

fn load(input: &Path) -> Result<Vec<Page>> {
    let pages = load_document(input).with_context(|| format!("failed to load {}", input.display()))?;
    println!("Loaded '{}': {} pages", input.display(), pages.len());
    Ok(pages)
}

fn preview(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push_str("...");
    }
    out
}

fn print_context(context: &[SearchResult]) {
    for (i, result) in context.iter().enumerate() {
        let page = result
            .chunk
            .metadata
            .page
            .map(|p| format!("page {}", p + 1))
            .unwrap_or_else(|| "page ?".to_string());
        println!("  #{} ({page}, score: {:.4})", i + 1, result.score);
        println!("  {}\n", preview(result.chunk.content.trim(), 300).replace('\n', " "));
    }
}

fn index(retriever: &mut dyn Retriever, pages: &[Page], index_dir: Option<&Path>) -> Result<IndexStats> {
    let stats = match index_dir {
        Some(dir) => {
            tracing::info!(retriever = retriever.name(), dir = %dir.display(), "indexing through snapshot directory");
            index_cached(retriever, pages, dir)
        }
        None => {
            tracing::info!(retriever = retriever.name(), pages = pages.len(), "indexing without snapshot");
            retriever.index(pages)
        }
    };
    stats.with_context(|| format!("failed to index with the {} retriever", retriever.name()))
}

fn print_stats(kind: PipelineKind, stats: &IndexStats) {
    if stats.stored > 0 {
        println!("[{kind}] indexed {} chunks, {} parents stored", stats.embedded, stats.stored);
    } else {
        println!("[{kind}] indexed {} chunks", stats.embedded);
    }
}

fn ask(
    services: &ServiceArgs,
    input: &Path,
    kinds: &[PipelineKind],
    questions: &[String],
    dry_run: bool,
    index_dir: Option<&Path>,
) -> Result<()> {
    // Build every client first so a missing credential fails before any work.
    let mut retrievers = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let reranker = match kind {
            PipelineKind::Rerank => Some(services.reranker()?),
            _ => None,
        };
        let retriever = build_retriever(kind, services.embedder()?, reranker)?;
        retrievers.push((kind, retriever));
    }
    let generators = if dry_run {
        Vec::new()
    } else {
        kinds.iter().map(|_| services.generator()).collect::<Result<Vec<_>>>()?
    };

    let pages = load(input)?;
    let questions: Vec<&str> = if questions.is_empty() {
        QUESTIONS.to_vec()
    } else {
        questions.iter().map(String::as_str).collect()
    };
    tracing::info!(
        pipelines = kinds.len(),
        questions = questions.len(),
        pages = pages.len(),
        dry_run,
        "starting comparison"
    );

    if dry_run {
        for (kind, mut retriever) in retrievers {
            let stats = index(retriever.as_mut(), &pages, index_dir)?;
            print_stats(kind, &stats);

            for (i, question) in questions.iter().enumerate() {
                println!("\n=== [{kind}] Q{}: {question} ===\n", i + 1);
                let context = retriever
                    .retrieve(question)
                    .with_context(|| format!("[{kind}] retrieval failed"))?;
                print_context(&context);
            }
        }
        return Ok(());
    }

    for ((kind, mut retriever), generator) in retrievers.into_iter().zip(generators) {
        let stats = index(retriever.as_mut(), &pages, index_dir)?;
        print_stats(kind, &stats);

        let mut pipeline = Pipeline::new(kind, retriever, generator);
        for (i, question) in questions.iter().enumerate() {
            println!("\n=== [{kind}] Q{}: {question} ===\n", i + 1);
            let answer = pipeline
                .answer(question)
                .with_context(|| format!("[{kind}] failed to answer question {}", i + 1))?;

            println!("Context:");
            print_context(&answer.context);
            println!("Answer:\n{}", answer.text);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chunk { input, size, overlap } => {
            let chunker = FixedSizeChunker::new(size, overlap).context("invalid chunk parameters")?;
            let pages = load(&input)?;
            let chunks = chunker.chunk_pages(&pages);

            println!("Chunked '{}' into {} chunks ({size}/{overlap}):\n", input.display(), chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                let page = chunk.metadata.page.map_or(0, |p| p + 1);
                println!(
                    "--- Chunk {} (page {page}, {} chars, id: {}) ---",
                    i + 1,
                    chunk.content.chars().count(),
                    &chunk.id[..8]
                );
                println!("{}\n", preview(&chunk.content, 200));
            }
        }

        Commands::Embed { text, query } => {
            let mut embedder = cli.services.embedder()?;

            let embedding = if query {
                println!("Embedding as query with {}: {text}", embedder.model_name());
                embedder.embed_query(&text)?
            } else {
                println!("Embedding as document with {}: {text}", embedder.model_name());
                embedder
                    .embed_documents(&[text.as_str()])?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("embedding service returned no vectors"))?
            };

            println!("\nEmbedding stats:");
            println!("  Dimensions: {}", embedding.len());
            println!("  First 5 values: {:?}", &embedding[..embedding.len().min(5)]);
            println!("  Min: {:.4}", embedding.iter().cloned().fold(f32::INFINITY, f32::min));
            println!("  Max: {:.4}", embedding.iter().cloned().fold(f32::NEG_INFINITY, f32::max));
        }

        Commands::Ask {
            input,
            pipeline,
            questions,
            dry_run,
            index_dir,
        } => {
            ask(&cli.services, &input, &pipeline.0, &questions, dry_run, index_dir.as_deref())?;
        }
    }

    Ok(())
}
