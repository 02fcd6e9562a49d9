use anyhow::Result;
use axum::Router;
use clap::Parser;
use qamatch::DEFAULT_THRESHOLD;
use server::{build_app, AppConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Question/answer corpus (JSON array or .jsonl)
    #[arg(long, default_value = "./sample_data/qa_pairs.json")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Minimum cosine score for a local answer
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Remote answer endpoint used below the threshold
    #[arg(long, env = "QAMATCH_REMOTE_URL")]
    remote_url: Option<String>,
    /// Remote request timeout in seconds
    #[arg(long, default_value_t = 15)]
    remote_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(AppConfig {
        corpus: args.corpus.clone(),
        threshold: args.threshold,
        remote_url: args.remote_url,
        remote_timeout: Duration::from_secs(args.remote_timeout_secs),
    })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, corpus = %args.corpus.display(), "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
