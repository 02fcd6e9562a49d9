use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qamatch::{
    rank, AnswerProvider, Assistant, CancelToken, DisabledProvider, EngineConfig, HttpAnswerProvider, Index,
    DEFAULT_THRESHOLD,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "qamatch")]
#[command(about = "Match questions against a curated Q&A corpus with TF-IDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a corpus and print its statistics
    Stats {
        /// Corpus file (JSON array or .jsonl)
        #[arg(long)]
        corpus: PathBuf,
    },
    /// Rank corpus questions against a query without any remote fallback
    Search {
        #[arg(long)]
        corpus: PathBuf,
        /// Number of results to print
        #[arg(short, long, default_value_t = 5)]
        k: usize,
        query: String,
    },
    /// Answer a question, asking the remote provider below the threshold
    Ask {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        #[arg(long, env = "QAMATCH_REMOTE_URL")]
        remote_url: Option<String>,
        #[arg(long, default_value_t = 15)]
        timeout_secs: u64,
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { corpus } => stats(&corpus),
        Commands::Search { corpus, k, query } => search(&corpus, k, &query),
        Commands::Ask { corpus, threshold, remote_url, timeout_secs, query } => {
            ask(&corpus, threshold, remote_url, Duration::from_secs(timeout_secs), &query).await
        }
    }
}

fn load(corpus: &Path) -> Result<Index> {
    Index::from_path(corpus).with_context(|| format!("indexing {}", corpus.display()))
}

fn stats(corpus: &Path) -> Result<()> {
    let index = load(corpus)?;
    println!("{}", serde_json::to_string_pretty(&index.stats())?);
    Ok(())
}

fn search(corpus: &Path, k: usize, query: &str) -> Result<()> {
    let index = load(corpus)?;
    for hit in rank(query, &index, k.max(1)) {
        if let Some(qa) = index.record(hit.position) {
            println!("{:>4}  {:.4}  {}", hit.position, hit.score, qa.question);
        }
    }
    Ok(())
}

async fn ask(corpus: &Path, threshold: f64, remote_url: Option<String>, timeout: Duration, query: &str) -> Result<()> {
    let index = load(corpus)?;
    let provider: Arc<dyn AnswerProvider> = match remote_url {
        Some(url) => Arc::new(HttpAnswerProvider::new(url, timeout)?),
        None => Arc::new(DisabledProvider),
    };
    let assistant = Assistant::new(index, EngineConfig { threshold, remote_timeout: timeout }, provider)?;

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let answer = assistant.answer(query, &cancel).await?;
    tracing::info!(source = ?answer.source, score = answer.score, "answered");
    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}
